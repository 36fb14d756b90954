//! Finding source files on disk and naming them inside an archive

use std::path::PathBuf;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use glob::Pattern;
use log::*;
use walkdir::WalkDir;

use crate::result::*;

/// Lists the files in `directory` whose names match `mask`,
/// descending into subdirectories if `recursive` is set.
///
/// Directory contents are visited in file name order,
/// so the same tree always produces the same list.
pub fn list_files(
    directory: &Utf8Path,
    mask: &str,
    recursive: bool,
) -> ArchiveResult<Vec<Utf8PathBuf>> {
    let pattern = Pattern::new(mask).map_err(|source| ArchiveError::InvalidMask {
        mask: mask.to_owned(),
        source,
    })?;

    let mut walker = WalkDir::new(directory).min_depth(1).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        // Follows symlinks to files, unlike entry.file_type()
        if !entry.path().is_file() {
            continue;
        }
        let path = utf8(entry.into_path())?;
        let matched = path.file_name().map_or(false, |name| pattern.matches(name));
        trace!("{path}: {}", if matched { "matched" } else { "skipped" });
        if matched {
            files.push(path);
        }
    }
    debug!("{} files in {directory} match '{mask}'", files.len());
    Ok(files)
}

/// Returns the directory `file` lives in, relative to `base`,
/// as a `/`-separated archive path (empty if `file` is directly in `base`).
pub fn relative_dir(file: &Utf8Path, base: &Utf8Path) -> String {
    let relative = file
        .parent()
        .and_then(|parent| parent.strip_prefix(base).ok());
    match relative {
        Some(dir) => dir
            .components()
            .filter_map(|c| match c {
                Utf8Component::Normal(part) => Some(part),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/"),
        None => {
            warn!("{file} isn't inside {base}; storing it at the archive root");
            String::new()
        }
    }
}

/// Joins an archive directory (possibly empty) and a file name.
pub fn entry_path(dir: &str, file_name: &str) -> String {
    if dir.is_empty() {
        file_name.to_owned()
    } else {
        format!("{dir}/{file_name}")
    }
}

/// Makes `path` absolute by joining it onto the working directory.
/// Unlike `canonicalize()`, this doesn't resolve symlinks or need `path` to exist.
pub(crate) fn absolute(path: &Utf8Path) -> ArchiveResult<Utf8PathBuf> {
    if path.is_absolute() {
        Ok(path.to_owned())
    } else {
        Ok(utf8(std::env::current_dir()?)?.join(path))
    }
}

pub(crate) fn utf8(path: PathBuf) -> ArchiveResult<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path)
        .map_err(|p| ArchiveError::InvalidPath(format!("{} isn't UTF-8", p.display())))
}

pub(crate) fn file_name(path: &Utf8Path) -> ArchiveResult<&str> {
    path.file_name()
        .ok_or_else(|| ArchiveError::InvalidPath(format!("{path} has no file name")))
}
