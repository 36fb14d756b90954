//! zipstage packs files into ZIP archives and unpacks them again,
//! with predictable answers to the awkward questions:
//! what if two files have the same name? What if the archive already exists?
//! What if an extracted file would clobber one already on disk?
//!
//! ```no_run
//! # use zipstage::*;
//! // Zip every .txt file under ./reports, keeping the folder structure,
//! // into out/reports.zip. If that exists, save out/reports_(1).zip instead.
//! let created = create_archive(
//!     &SourceSelector::directory("reports").file_mask("*.txt").recursive(true),
//!     &ArchiveTarget::new("out", "reports.zip"),
//!     &CreateOptions::default().on_destination_exists(CollisionDecision::Rename),
//!     &CancellationToken::new(),
//! )?;
//! println!("{} files in {}", created.file_count, created.path);
//!
//! // And back out again, renaming anything that's in the way.
//! let extracted = extract_archive(
//!     &ExtractSource::new(&created.path, "unpacked"),
//!     &ExtractOptions::default()
//!         .create_destination_directory(true)
//!         .on_destination_exists(ExtractCollision::Rename),
//!     &CancellationToken::new(),
//! )?;
//! for path in &extracted.extracted_files {
//!     println!("{path}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Building is staged: nothing is written until every file has been accepted,
//! and the archive is then saved in one go (to a temporary file that's renamed
//! into place). Extraction is not: entries land on disk as they're read,
//! and a failure partway through leaves the earlier ones where they are.
//!
//! When names collide, the newcomer gets a counter before its extension:
//! `notes.txt` becomes `notes_(1).txt`, then `notes_(2).txt`, and so on.
//! See [`naming`](naming/index.html).

pub mod cancel;
pub mod codec;
pub mod create;
pub mod extract;
pub mod fs;
pub mod naming;
pub mod options;
pub mod result;

pub use cancel::CancellationToken;
pub use create::{create_archive, CreateOutput};
pub use extract::{extract_archive, ExtractOutput};
pub use options::*;
pub use result::{ArchiveError, ArchiveResult};
