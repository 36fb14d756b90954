//! Building archives from files on disk

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use log::*;

use crate::cancel::CancellationToken;
use crate::codec::{ArchiveWriter, EntryData};
use crate::fs::{entry_path, file_name, list_files, relative_dir};
use crate::naming::{unique_name, unique_path};
use crate::options::*;
use crate::result::*;

/// What [`create_archive()`] made
///
/// [`create_archive()`]: fn.create_archive.html
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOutput {
    /// Where the archive was saved (empty if nothing was archived)
    pub path: Utf8PathBuf,
    /// Entries in the archive, including any it had before we appended to it
    pub file_count: usize,
    /// Entry names in the archive, in archive order
    pub archived_files: Vec<String>,
}

impl CreateOutput {
    fn empty() -> Self {
        Self {
            path: Utf8PathBuf::new(),
            file_count: 0,
            archived_files: Vec::new(),
        }
    }
}

/// Zips the files chosen by `source` into the archive described by `target`.
///
/// Preconditions are checked before anything is opened or written.
/// Entries are staged in memory (as paths) and the archive is saved once at
/// the end, so failures or cancellation before that point leave the
/// destination untouched.
pub fn create_archive(
    source: &SourceSelector,
    target: &ArchiveTarget,
    options: &CreateOptions,
    cancel: &CancellationToken,
) -> ArchiveResult<CreateOutput> {
    if let SourceSelector::PathAndMask { directory, .. } = source {
        if !directory.is_dir() {
            return Err(ArchiveError::SourceNotFound(directory.clone()));
        }
    }
    if !target.directory.is_dir() && !options.create_destination_directory {
        return Err(ArchiveError::DestinationNotFound(target.directory.clone()));
    }

    let source_files = match source {
        SourceSelector::PathAndMask {
            directory,
            file_mask,
            recursive,
        } => list_files(directory, file_mask, *recursive)?,
        SourceSelector::FileList(files) => files.clone(),
    };

    if source_files.is_empty() {
        let (directory, mask) = match source {
            SourceSelector::PathAndMask {
                directory,
                file_mask,
                ..
            } => (directory.clone(), file_mask.clone()),
            SourceSelector::FileList(_) => (Utf8PathBuf::new(), String::new()),
        };
        if options.throw_if_no_files_found {
            return Err(ArchiveError::NoFilesFound { directory, mask });
        }
        info!("No files in {directory} match '{mask}'; nothing to archive");
        return Ok(CreateOutput::empty());
    }

    if !target.directory.is_dir() {
        debug!("Creating destination directory {}", target.directory);
        fs::create_dir_all(&target.directory)?;
    }

    let (archive_path, mut writer) = open_destination(target, options.on_destination_exists)?;
    info!("Archiving {} files into {archive_path}", source_files.len());

    writer.set_zip64_mode(options.zip64);
    if let Some(password) = target.effective_password() {
        debug!("Encrypting new entries");
        writer.set_password(Some(password));
    }

    // File lists carry no directory structure to preserve.
    let base = match source.base_directory() {
        Some(base) if !options.flatten => Some(base),
        _ => None,
    };

    for source_file in &source_files {
        cancel.check()?;
        let dir = match base {
            Some(base) => relative_dir(source_file, base),
            None => String::new(),
        };
        stage_file(
            &mut writer,
            source_file,
            &dir,
            target.rename_duplicate_entries,
        )?;
    }

    let file_count = writer.len();
    let archived_files = writer.entry_names().to_vec();
    writer.save(&archive_path)?;

    if options.delete_source_files {
        delete_sources(&source_files)?;
    }

    Ok(CreateOutput {
        path: archive_path,
        file_count,
        archived_files,
    })
}

/// Decides where the archive goes and what it starts with,
/// given whatever might already be at the target path.
fn open_destination(
    target: &ArchiveTarget,
    decision: CollisionDecision,
) -> ArchiveResult<(Utf8PathBuf, ArchiveWriter)> {
    let path = target.path();
    if !path.exists() {
        return Ok((path, ArchiveWriter::create()));
    }

    debug!("{path} already exists: {decision:?}");
    match decision {
        CollisionDecision::Error => Err(ArchiveError::DestinationAlreadyExists(path)),
        CollisionDecision::Overwrite => Ok((path, ArchiveWriter::create())),
        CollisionDecision::Rename => {
            let renamed = unique_path(&target.directory, &target.file_name);
            info!("Saving as {renamed} instead");
            Ok((renamed, ArchiveWriter::create()))
        }
        CollisionDecision::Append => {
            let writer = ArchiveWriter::open_for_append(&path)?;
            Ok((path, writer))
        }
    }
}

/// Stages `source_file` under `dir`.
///
/// A file whose name matches the last component of any entry already in the
/// archive (in any directory) is a duplicate. Duplicates are either refused
/// or given a file name no other entry ends in, and stay in `dir`.
fn stage_file(
    writer: &mut ArchiveWriter,
    source_file: &Utf8Path,
    dir: &str,
    rename_duplicates: bool,
) -> ArchiveResult<()> {
    let name = file_name(source_file)?;
    let mut entry = entry_path(dir, name);

    if writer.contains_file_name(name) {
        if !rename_duplicates {
            return Err(ArchiveError::DuplicateEntryName {
                source_file: source_file.to_owned(),
                entry,
            });
        }
        let renamed = unique_name(name, |candidate| writer.contains_file_name(candidate));
        let renamed = entry_path(dir, &renamed);
        debug!("{name} is already in the archive; adding {source_file} as {renamed}");
        entry = renamed;
    }

    writer.add_entry(entry, EntryData::File(source_file.to_owned()));
    Ok(())
}

/// Removes every source file, stopping at the first failure.
fn delete_sources(source_files: &[Utf8PathBuf]) -> ArchiveResult<()> {
    for path in source_files {
        debug!("Deleting {path}");
        fs::remove_file(path).map_err(|source| ArchiveError::SourceCleanupFailed {
            path: path.clone(),
            source,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn temp_dir() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8Path::from_path(dir.path()).unwrap().to_owned();
        (dir, path)
    }

    #[test]
    fn duplicates_renamed_in_place() {
        let (_guard, dir) = temp_dir();
        let source = dir.join("a.txt");
        fs::write(&source, b"a").unwrap();

        let mut writer = ArchiveWriter::create();
        stage_file(&mut writer, &source, "sub", true).unwrap();
        stage_file(&mut writer, &source, "sub", true).unwrap();
        stage_file(&mut writer, &source, "", true).unwrap();
        stage_file(&mut writer, &source, "sub", true).unwrap();
        assert_eq!(
            writer.entry_names(),
            ["sub/a.txt", "sub/a_(1).txt", "a_(2).txt", "sub/a_(3).txt"]
        );
    }

    #[test]
    fn same_name_in_other_directory_is_a_duplicate() {
        let (_guard, dir) = temp_dir();
        let source = dir.join("a.txt");
        fs::write(&source, b"a").unwrap();

        let mut writer = ArchiveWriter::create();
        stage_file(&mut writer, &source, "", false).unwrap();
        match stage_file(&mut writer, &source, "sub", false) {
            Err(ArchiveError::DuplicateEntryName { entry, .. }) => assert_eq!(entry, "sub/a.txt"),
            other => panic!("Expected a duplicate entry error, got {:?}", other),
        }
    }

    #[test]
    fn duplicates_rejected() {
        let (_guard, dir) = temp_dir();
        let source = dir.join("a.txt");
        fs::write(&source, b"a").unwrap();

        let mut writer = ArchiveWriter::create();
        stage_file(&mut writer, &source, "", false).unwrap();
        match stage_file(&mut writer, &source, "", false) {
            Err(ArchiveError::DuplicateEntryName { source_file, entry }) => {
                assert_eq!(source_file, source);
                assert_eq!(entry, "a.txt");
            }
            other => panic!("Expected a duplicate entry error, got {:?}", other),
        }
        assert_eq!(writer.len(), 1);
    }

    #[test]
    fn cancelled_before_save() {
        let (_guard, dir) = temp_dir();
        let input = dir.join("in");
        fs::create_dir(&input).unwrap();
        fs::write(input.join("a.txt"), b"a").unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = create_archive(
            &SourceSelector::directory(&input),
            &ArchiveTarget::new(&dir, "out.zip"),
            &CreateOptions::default(),
            &cancel,
        );
        assert!(matches!(result, Err(ArchiveError::Cancelled)));
        assert!(!dir.join("out.zip").exists());
    }
}
