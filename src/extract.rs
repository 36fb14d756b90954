//! Unpacking archives into directories

use std::fs::{self, File, OpenOptions};
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use log::*;

use crate::cancel::CancellationToken;
use crate::codec::{ArchiveReader, EntryInfo};
use crate::fs::{absolute, file_name};
use crate::naming::unique_path;
use crate::options::*;
use crate::result::*;

/// What [`extract_archive()`] wrote
///
/// [`extract_archive()`]: fn.extract_archive.html
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractOutput {
    /// Absolute paths of the files written, in the order they were extracted.
    /// Directories aren't listed.
    pub extracted_files: Vec<Utf8PathBuf>,
}

/// Extracts every entry of `source.archive_path` into `source.destination_directory`.
///
/// Entries are written one at a time as they're read.
/// If something goes wrong partway through, whatever was already written
/// stays on disk.
pub fn extract_archive(
    source: &ExtractSource,
    options: &ExtractOptions,
    cancel: &CancellationToken,
) -> ArchiveResult<ExtractOutput> {
    if !source.archive_path.is_file() {
        return Err(ArchiveError::SourceNotFound(source.archive_path.clone()));
    }
    if !source.destination_directory.is_dir() {
        if !options.create_destination_directory {
            return Err(ArchiveError::DestinationNotFound(
                source.destination_directory.clone(),
            ));
        }
        debug!("Creating destination directory {}", source.destination_directory);
        fs::create_dir_all(&source.destination_directory)?;
    }
    let destination = absolute(&source.destination_directory)?;

    let mut reader = ArchiveReader::open(&source.archive_path, source.effective_password())?;
    info!(
        "Extracting {} entries from {} into {destination}",
        reader.len(),
        source.archive_path
    );

    let mut extracted_files = Vec::with_capacity(reader.len());
    for entry in reader.entries()? {
        cancel.check()?;
        if let Some(written) = extract_one(
            &mut reader,
            &entry,
            &destination,
            options.on_destination_exists,
        )? {
            extracted_files.push(written);
        }
    }

    if options.delete_archive_after_extract {
        debug!("Deleting {}", source.archive_path);
        fs::remove_file(&source.archive_path).map_err(|e| {
            ArchiveError::PostExtractCleanupFailed {
                path: source.archive_path.clone(),
                source: e,
            }
        })?;
    }

    Ok(ExtractOutput { extracted_files })
}

/// Extracts a single entry, returning where it was written
/// (or `None` for directories).
fn extract_one(
    reader: &mut ArchiveReader,
    entry: &EntryInfo,
    destination: &Utf8Path,
    collision: ExtractCollision,
) -> ArchiveResult<Option<Utf8PathBuf>> {
    let relative = entry
        .enclosed_path
        .as_ref()
        .ok_or_else(|| ArchiveError::UnsafeEntryPath(entry.name.clone()))?;
    let natural = destination.join(relative);

    if entry.is_dir {
        match collision {
            ExtractCollision::Rename => trace!("Skipping directory entry {}", entry.name),
            ExtractCollision::Error | ExtractCollision::Overwrite => {
                trace!("Creating directory {natural}");
                fs::create_dir_all(&natural)?;
            }
        }
        return Ok(None);
    }

    let parent = natural.parent().unwrap_or(destination);
    fs::create_dir_all(parent)?;

    let target = match collision {
        ExtractCollision::Error | ExtractCollision::Overwrite => natural,
        ExtractCollision::Rename if natural.exists() => {
            let renamed = unique_path(parent, file_name(&natural)?);
            debug!("{natural} exists; extracting {} to {renamed}", entry.name);
            renamed
        }
        ExtractCollision::Rename => natural,
    };

    let bytes = match collision {
        ExtractCollision::Overwrite => reader.extract_entry(entry, || Ok(File::create(&target)?))?,
        ExtractCollision::Error | ExtractCollision::Rename => {
            reader.extract_entry(entry, || create_new(&target))?
        }
    };
    debug!("Extracted {} to {target} ({bytes} bytes)", entry.name);
    Ok(Some(target))
}

/// Creates `path`, failing with `DestinationAlreadyExists` if it's already there.
fn create_new(path: &Utf8Path) -> ArchiveResult<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => ArchiveError::DestinationAlreadyExists(path.to_owned()),
            _ => ArchiveError::Io(e),
        })
}
