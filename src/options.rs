//! What to archive, where to put it, and what to do when something's in the way.

use camino::{Utf8Path, Utf8PathBuf};

/// Which files go into a new archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSelector {
    /// Every file in `directory` whose name matches `file_mask`
    /// (a single glob like `*.txt`), descending into subdirectories
    /// if `recursive` is set.
    PathAndMask {
        directory: Utf8PathBuf,
        file_mask: String,
        recursive: bool,
    },
    /// An explicit list of files. These are always stored flat,
    /// since there's no base directory to be relative to.
    FileList(Vec<Utf8PathBuf>),
}

impl SourceSelector {
    /// All files directly in `directory`.
    pub fn directory<P: Into<Utf8PathBuf>>(directory: P) -> Self {
        Self::PathAndMask {
            directory: directory.into(),
            file_mask: String::from("*"),
            recursive: false,
        }
    }

    pub fn file_mask<S: Into<String>>(self, mask: S) -> Self {
        match self {
            Self::PathAndMask {
                directory,
                recursive,
                ..
            } => Self::PathAndMask {
                directory,
                file_mask: mask.into(),
                recursive,
            },
            list => list,
        }
    }

    pub fn recursive(self, recurse: bool) -> Self {
        match self {
            Self::PathAndMask {
                directory,
                file_mask,
                ..
            } => Self::PathAndMask {
                directory,
                file_mask,
                recursive: recurse,
            },
            list => list,
        }
    }

    /// The directory entry paths are made relative to, if there is one.
    pub fn base_directory(&self) -> Option<&Utf8Path> {
        match self {
            Self::PathAndMask { directory, .. } => Some(directory.as_path()),
            Self::FileList(_) => None,
        }
    }
}

/// The archive file to create (or add to).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveTarget {
    pub directory: Utf8PathBuf,
    pub file_name: String,
    /// Encrypts new entries if set to something other than whitespace.
    pub password: Option<String>,
    /// Rename files whose names are already in the archive
    /// (`a.txt` -> `a_(1).txt`) instead of failing.
    pub rename_duplicate_entries: bool,
}

impl ArchiveTarget {
    pub fn new<P: Into<Utf8PathBuf>, S: Into<String>>(directory: P, file_name: S) -> Self {
        Self {
            directory: directory.into(),
            file_name: file_name.into(),
            password: None,
            rename_duplicate_entries: true,
        }
    }

    pub fn password<S: Into<String>>(mut self, password: S) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn rename_duplicate_entries(mut self, rename: bool) -> Self {
        self.rename_duplicate_entries = rename;
        self
    }

    pub fn path(&self) -> Utf8PathBuf {
        self.directory.join(&self.file_name)
    }

    /// The password, unless it's missing or blank.
    pub fn effective_password(&self) -> Option<&str> {
        effective_password(self.password.as_deref())
    }
}

pub(crate) fn effective_password(password: Option<&str>) -> Option<&str> {
    password.filter(|p| !p.trim().is_empty())
}

/// What to do when the archive we're building already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionDecision {
    /// Fail with `DestinationAlreadyExists`.
    #[default]
    Error,
    /// Replace the existing archive.
    Overwrite,
    /// Save as `name_(1).zip` (or the next free number) instead.
    Rename,
    /// Add the new files to the existing archive.
    Append,
}

/// What to do when an extracted file already exists on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractCollision {
    /// Fail with `DestinationAlreadyExists`, leaving what's been written so far.
    #[default]
    Error,
    /// Silently replace the existing file.
    Overwrite,
    /// Write `name_(1).ext` (or the next free number) next to it.
    Rename,
}

/// When to use ZIP64 extensions while saving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zip64Mode {
    /// Always, even when unnecessary.
    Always,
    /// Only for entries too large for the classic format.
    #[default]
    AsNecessary,
    /// Never; saving an entry that needs ZIP64 fails.
    Never,
}

/// Knobs for [`create_archive()`](../create/fn.create_archive.html)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOptions {
    /// Store every file at the archive root.
    pub flatten: bool,
    pub create_destination_directory: bool,
    /// If false, finding no files returns an empty result instead of an error.
    pub throw_if_no_files_found: bool,
    pub zip64: Zip64Mode,
    pub on_destination_exists: CollisionDecision,
    /// Delete the source files once the archive is saved.
    pub delete_source_files: bool,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            flatten: false,
            create_destination_directory: false,
            throw_if_no_files_found: true,
            zip64: Zip64Mode::default(),
            on_destination_exists: CollisionDecision::default(),
            delete_source_files: false,
        }
    }
}

impl CreateOptions {
    pub fn flatten(mut self, flatten: bool) -> Self {
        self.flatten = flatten;
        self
    }

    pub fn create_destination_directory(mut self, create: bool) -> Self {
        self.create_destination_directory = create;
        self
    }

    pub fn throw_if_no_files_found(mut self, throw: bool) -> Self {
        self.throw_if_no_files_found = throw;
        self
    }

    pub fn zip64(mut self, mode: Zip64Mode) -> Self {
        self.zip64 = mode;
        self
    }

    pub fn on_destination_exists(mut self, decision: CollisionDecision) -> Self {
        self.on_destination_exists = decision;
        self
    }

    pub fn delete_source_files(mut self, delete: bool) -> Self {
        self.delete_source_files = delete;
        self
    }
}

/// The archive to unpack and where to unpack it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractSource {
    pub archive_path: Utf8PathBuf,
    pub password: Option<String>,
    pub destination_directory: Utf8PathBuf,
}

impl ExtractSource {
    pub fn new<A: Into<Utf8PathBuf>, D: Into<Utf8PathBuf>>(archive: A, destination: D) -> Self {
        Self {
            archive_path: archive.into(),
            password: None,
            destination_directory: destination.into(),
        }
    }

    pub fn password<S: Into<String>>(mut self, password: S) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn effective_password(&self) -> Option<&str> {
        effective_password(self.password.as_deref())
    }
}

/// Knobs for [`extract_archive()`](../extract/fn.extract_archive.html)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    pub create_destination_directory: bool,
    pub on_destination_exists: ExtractCollision,
    pub delete_archive_after_extract: bool,
}

impl ExtractOptions {
    pub fn create_destination_directory(mut self, create: bool) -> Self {
        self.create_destination_directory = create;
        self
    }

    pub fn on_destination_exists(mut self, decision: ExtractCollision) -> Self {
        self.on_destination_exists = decision;
        self
    }

    pub fn delete_archive_after_extract(mut self, delete: bool) -> Self {
        self.delete_archive_after_extract = delete;
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn create_defaults() {
        let options = CreateOptions::default();
        assert!(!options.flatten);
        assert!(!options.create_destination_directory);
        assert!(options.throw_if_no_files_found);
        assert_eq!(options.zip64, Zip64Mode::AsNecessary);
        assert_eq!(options.on_destination_exists, CollisionDecision::Error);
        assert!(!options.delete_source_files);
    }

    #[test]
    fn selector_builders_ignore_file_lists() {
        let dir = SourceSelector::directory("/in").file_mask("*.txt").recursive(true);
        assert_eq!(
            dir,
            SourceSelector::PathAndMask {
                directory: Utf8PathBuf::from("/in"),
                file_mask: String::from("*.txt"),
                recursive: true,
            }
        );
        assert_eq!(dir.base_directory(), Some(Utf8Path::new("/in")));

        let list = SourceSelector::FileList(vec![Utf8PathBuf::from("/in/a")]);
        assert_eq!(list.clone().recursive(true).file_mask("*.zip"), list);
        assert_eq!(list.base_directory(), None);
    }

    #[test]
    fn blank_passwords_are_no_passwords() {
        let target = ArchiveTarget::new("/out", "a.zip");
        assert_eq!(target.effective_password(), None);
        assert_eq!(target.clone().password("  \t").effective_password(), None);
        assert_eq!(target.password("hunter2").effective_password(), Some("hunter2"));
    }

    #[test]
    fn target_path() {
        let target = ArchiveTarget::new("/out", "a.zip");
        assert!(target.rename_duplicate_entries);
        assert_eq!(target.path(), Utf8PathBuf::from("/out/a.zip"));
    }
}
