use anyhow::*;
use camino::Utf8PathBuf;
use log::*;
use structopt::*;

use zipstage::*;

#[derive(Debug, StructOpt)]
#[structopt(name = "mkzip", about = "Zips files from a directory (or a list) into a .zip file")]
struct Opt {
    /// Pass multiple times for additional verbosity (info, debug, trace)
    #[structopt(short, long, parse(from_occurrences))]
    verbosity: usize,

    /// Directory to search for files to archive
    #[structopt(short = "C", long, conflicts_with = "files")]
    directory: Option<Utf8PathBuf>,

    /// Archive files matching this mask (with -C)
    #[structopt(short, long, default_value = "*")]
    mask: String,

    /// Search subdirectories too (with -C)
    #[structopt(short, long)]
    recursive: bool,

    /// Store every file at the root of the archive
    #[structopt(short, long)]
    flatten: bool,

    /// Encrypt entries (AES-256) with this password
    #[structopt(short = "P", long)]
    password: Option<String>,

    /// Fail instead of renaming entries whose names are already taken
    #[structopt(long)]
    no_rename: bool,

    /// What to do if the archive already exists: error, overwrite, rename, or append
    #[structopt(short = "x", long, default_value = "error", parse(try_from_str = parse_decision))]
    on_exists: CollisionDecision,

    /// When to use ZIP64 extensions: always, as-necessary, or never
    #[structopt(long, default_value = "as-necessary", parse(try_from_str = parse_zip64))]
    zip64: Zip64Mode,

    /// Create the archive's directory if it doesn't exist
    #[structopt(short = "p", long)]
    create_dir: bool,

    /// Succeed without writing anything if no files match
    #[structopt(long)]
    allow_empty: bool,

    /// Delete the source files once they're archived
    #[structopt(long)]
    delete_sources: bool,

    #[structopt(name("ZIP file"))]
    zip_path: Utf8PathBuf,

    /// Files to archive, if no directory is given
    #[structopt(name("files"))]
    files: Vec<Utf8PathBuf>,
}

fn parse_decision(s: &str) -> Result<CollisionDecision> {
    match s {
        "error" => Ok(CollisionDecision::Error),
        "overwrite" => Ok(CollisionDecision::Overwrite),
        "rename" => Ok(CollisionDecision::Rename),
        "append" => Ok(CollisionDecision::Append),
        other => bail!("Unknown collision decision '{}'", other),
    }
}

fn parse_zip64(s: &str) -> Result<Zip64Mode> {
    match s {
        "always" => Ok(Zip64Mode::Always),
        "as-necessary" => Ok(Zip64Mode::AsNecessary),
        "never" => Ok(Zip64Mode::Never),
        other => bail!("Unknown ZIP64 mode '{}'", other),
    }
}

fn main() -> Result<()> {
    let args = Opt::from_args();

    let mut errlog = stderrlog::new();
    errlog.verbosity(args.verbosity + 1);
    errlog.init()?;

    let source = match (&args.directory, args.files.is_empty()) {
        (Some(dir), _) => SourceSelector::directory(dir)
            .file_mask(args.mask.as_str())
            .recursive(args.recursive),
        (None, false) => SourceSelector::FileList(args.files.clone()),
        (None, true) => bail!("Give a directory (-C) or some files to archive"),
    };

    let file_name = args
        .zip_path
        .file_name()
        .with_context(|| format!("{} isn't a file name", args.zip_path))?;
    let directory = match args.zip_path.parent() {
        Some(p) if !p.as_str().is_empty() => p.to_owned(),
        _ => Utf8PathBuf::from("."),
    };
    let mut target =
        ArchiveTarget::new(directory, file_name).rename_duplicate_entries(!args.no_rename);
    if let Some(password) = &args.password {
        target = target.password(password.as_str());
    }

    let options = CreateOptions::default()
        .flatten(args.flatten)
        .create_destination_directory(args.create_dir)
        .throw_if_no_files_found(!args.allow_empty)
        .zip64(args.zip64)
        .on_destination_exists(args.on_exists)
        .delete_source_files(args.delete_sources);

    let created = create_archive(&source, &target, &options, &CancellationToken::new())
        .with_context(|| format!("Couldn't create {}", args.zip_path))?;

    if created.file_count == 0 {
        warn!("No files matched; nothing written");
        return Ok(());
    }
    for name in &created.archived_files {
        debug!("  {}", name);
    }
    info!("Wrote {} entries to {}", created.file_count, created.path);
    println!("{}", created.path);
    Ok(())
}
