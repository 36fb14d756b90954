//! Error types and the related `Result<T>`

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

pub type ArchiveResult<T> = Result<T, ArchiveError>;

#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The source directory (or source archive) doesn't exist.
    #[error("Source {0} does not exist")]
    SourceNotFound(Utf8PathBuf),

    /// The destination directory doesn't exist and we weren't asked to create it.
    #[error("Destination directory {0} does not exist")]
    DestinationNotFound(Utf8PathBuf),

    /// The source selection matched nothing.
    #[error("No files found in {directory} with file mask '{mask}'")]
    NoFilesFound { directory: Utf8PathBuf, mask: String },

    /// Something is already sitting at the destination path.
    #[error("Destination file {0} already exists")]
    DestinationAlreadyExists(Utf8PathBuf),

    /// Two files wanted the same name in the archive and renaming is off.
    #[error("File {source_file} already exists in the archive as {entry}")]
    DuplicateEntryName {
        source_file: Utf8PathBuf,
        entry: String,
    },

    /// An encrypted entry couldn't be decrypted with the given password
    /// (or no password was given at all).
    #[error("Wrong or missing password for entry {0}")]
    BadPassword(String),

    /// Everything was extracted, but the archive couldn't be removed afterwards.
    #[error("Extracted successfully, but couldn't delete {path}")]
    PostExtractCleanupFailed {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    /// The archive was saved, but a source file couldn't be removed afterwards.
    #[error("Archive saved, but couldn't delete source file {path}")]
    SourceCleanupFailed {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    /// The caller asked us to stop.
    #[error("Operation cancelled")]
    Cancelled,

    /// The file mask isn't a valid pattern.
    #[error("Invalid file mask '{mask}'")]
    InvalidMask {
        mask: String,
        #[source]
        source: glob::PatternError,
    },

    /// A path provided by the caller or found on disk was unusable
    /// (not UTF-8, no file name, etc.)
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// An archive entry would land outside the destination directory.
    #[error("Entry {0} would be extracted outside of the destination directory")]
    UnsafeEntryPath(String),

    /// An error from underlying I/O
    #[error("I/O Error")]
    Io(#[from] io::Error),

    /// An error from the ZIP codec
    #[error("ZIP error")]
    Zip(#[from] zip::result::ZipError),

    /// An error while walking the source directory
    #[error("Couldn't walk source directory")]
    Walk(#[from] walkdir::Error),
}
