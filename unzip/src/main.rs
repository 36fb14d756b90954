use anyhow::*;
use camino::{Utf8Path, Utf8PathBuf};
use log::*;
use structopt::*;

use zipstage::codec::ArchiveReader;
use zipstage::*;

#[derive(Debug, StructOpt)]
#[structopt(name = "unzip", about = "Dumps a .zip file into a directory")]
struct Opt {
    /// Pass multiple times for additional verbosity (info, debug, trace)
    #[structopt(short, long, parse(from_occurrences))]
    verbosity: usize,

    /// Extract into the given directory instead of the current one
    #[structopt(short = "C", long, default_value = ".")]
    directory: Utf8PathBuf,

    /// Create the destination directory if it doesn't exist
    #[structopt(short = "p", long)]
    create_dir: bool,

    /// Password for encrypted entries
    #[structopt(short = "P", long)]
    password: Option<String>,

    /// What to do with files that are already there: error, overwrite, or rename
    #[structopt(short = "x", long, default_value = "error", parse(try_from_str = parse_collision))]
    on_exists: ExtractCollision,

    /// Delete the archive once everything is extracted
    #[structopt(long)]
    delete_archive: bool,

    /// Prints the files in the ZIP archive instead of extracting them.
    #[structopt(short = "n", long)]
    dry_run: bool,

    #[structopt(name("ZIP file"))]
    zip_path: Utf8PathBuf,
}

fn parse_collision(s: &str) -> Result<ExtractCollision> {
    match s {
        "error" => Ok(ExtractCollision::Error),
        "overwrite" => Ok(ExtractCollision::Overwrite),
        "rename" => Ok(ExtractCollision::Rename),
        other => bail!("Unknown collision decision '{}'", other),
    }
}

fn main() -> Result<()> {
    let args = Opt::from_args();

    let mut errlog = stderrlog::new();
    errlog.verbosity(args.verbosity + 1);
    errlog.init()?;

    if args.dry_run {
        return list_zip(&args.zip_path);
    }

    let mut source = ExtractSource::new(&args.zip_path, &args.directory);
    if let Some(password) = &args.password {
        source = source.password(password.as_str());
    }
    let options = ExtractOptions::default()
        .create_destination_directory(args.create_dir)
        .on_destination_exists(args.on_exists)
        .delete_archive_after_extract(args.delete_archive);

    let extracted = extract_archive(&source, &options, &CancellationToken::new())
        .with_context(|| format!("Couldn't extract {}", args.zip_path))?;
    info!(
        "Extracted {} files into {}",
        extracted.extracted_files.len(),
        args.directory
    );
    for path in &extracted.extracted_files {
        println!("{}", path);
    }
    Ok(())
}

fn list_zip(zip_path: &Utf8Path) -> Result<()> {
    let mut reader = ArchiveReader::open(zip_path, None).context("Couldn't load archive")?;
    for entry in reader.entries()? {
        match &entry.enclosed_path {
            Some(_) => println!("{}", entry.name),
            None => warn!("{} would land outside the destination", entry.name),
        }
    }
    Ok(())
}
