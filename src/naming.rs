//! Collision renaming: `report.txt` becomes `report_(1).txt`, `report_(2).txt`, ...
//!
//! The counter search is a single function over an "is this name taken?"
//! predicate, so the same logic serves the entries of an archive being built
//! and the files of a directory on disk.

use camino::{Utf8Path, Utf8PathBuf};
use log::*;

/// Returns `name` with the counter `n` inserted before its extension.
///
/// ```
/// # use zipstage::naming::numbered_name;
/// assert_eq!(numbered_name("report.txt", 1), "report_(1).txt");
/// assert_eq!(numbered_name("archive.tar.gz", 2), "archive.tar_(2).gz");
/// assert_eq!(numbered_name("README", 3), "README_(3)");
/// ```
pub fn numbered_name(name: &str, n: usize) -> String {
    let as_path = Utf8Path::new(name);
    let stem = as_path.file_stem().unwrap_or(name);
    match as_path.extension() {
        Some(ext) => format!("{stem}_({n}).{ext}"),
        None => format!("{stem}_({n})"),
    }
}

/// Finds the first `numbered_name(name, n)`, counting up from 1,
/// for which `is_taken` returns false.
///
/// `name` itself is never returned, so callers should only ask
/// once they know it collides.
pub fn unique_name<F>(name: &str, mut is_taken: F) -> String
where
    F: FnMut(&str) -> bool,
{
    let mut n = 1;
    loop {
        let candidate = numbered_name(name, n);
        if !is_taken(&candidate) {
            trace!("{name} -> {candidate}");
            return candidate;
        }
        n += 1;
    }
}

/// Like [`unique_name()`], but probes `directory` on disk.
/// Returns the full path of the first free name.
///
/// [`unique_name()`]: fn.unique_name.html
pub fn unique_path(directory: &Utf8Path, name: &str) -> Utf8PathBuf {
    let free = unique_name(name, |candidate| directory.join(candidate).exists());
    directory.join(free)
}
