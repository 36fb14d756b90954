//! A thin layer over the `zip` crate, shaped the way the builder and extractor use it.
//!
//! Writing is staged: entries are collected by [`ArchiveWriter`] and nothing
//! touches the destination until [`ArchiveWriter::save()`], which writes a
//! temporary file next to the destination and renames it into place.
//! An archive opened for appending is left alone until then.
//!
//! [`ArchiveWriter`]: struct.ArchiveWriter.html
//! [`ArchiveWriter::save()`]: struct.ArchiveWriter.html#method.save

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};
use log::*;
use tempfile::NamedTempFile;
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{AesMode, CompressionMethod, ZipArchive, ZipWriter};

use crate::options::Zip64Mode;
use crate::result::*;

/// Entries this size or larger can't be described without ZIP64 extensions.
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// Where a staged entry's contents come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryData {
    /// Read from this file when the archive is saved.
    File(Utf8PathBuf),
    Bytes(Vec<u8>),
}

impl EntryData {
    fn size(&self) -> io::Result<u64> {
        match self {
            EntryData::File(path) => Ok(fs::metadata(path)?.len()),
            EntryData::Bytes(bytes) => Ok(bytes.len() as u64),
        }
    }
}

/// An entry waiting for [`ArchiveWriter::save()`](struct.ArchiveWriter.html#method.save)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedEntry {
    pub name: String,
    pub data: EntryData,
}

/// A ZIP archive being put together
pub struct ArchiveWriter {
    /// The archive we're adding to, if appending.
    existing: Option<ZipArchive<File>>,
    /// Every entry name, existing ones first, in the order they'll be saved.
    names: Vec<String>,
    /// `names`, for quick lookups
    taken: HashSet<String>,
    /// The last path component of every entry in `names`
    file_names: HashSet<String>,
    staged: Vec<StagedEntry>,
    password: Option<String>,
    zip64: Zip64Mode,
}

impl ArchiveWriter {
    /// Starts an empty archive.
    pub fn create() -> Self {
        Self {
            existing: None,
            names: Vec::new(),
            taken: HashSet::new(),
            file_names: HashSet::new(),
            staged: Vec::new(),
            password: None,
            zip64: Zip64Mode::default(),
        }
    }

    /// Starts from the entries of the archive at `path`.
    /// The file isn't modified until the new archive is saved.
    pub fn open_for_append(path: &Utf8Path) -> ArchiveResult<Self> {
        let archive = ZipArchive::new(File::open(path)?)?;
        let names: Vec<String> = archive.file_names().map(str::to_owned).collect();
        debug!("Appending to {path}, which has {} entries", names.len());
        let taken = names.iter().cloned().collect();
        let file_names = names.iter().filter_map(|n| last_component(n)).collect();
        Ok(Self {
            existing: Some(archive),
            names,
            taken,
            file_names,
            ..Self::create()
        })
    }

    /// Encrypts entries added from now on. Existing entries keep whatever
    /// protection they already had.
    pub fn set_password(&mut self, password: Option<&str>) {
        self.password = password.map(str::to_owned);
    }

    pub fn set_zip64_mode(&mut self, mode: Zip64Mode) {
        self.zip64 = mode;
    }

    pub fn contains_entry(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Does any entry, in whatever directory, end in `file_name`?
    pub fn contains_file_name(&self, file_name: &str) -> bool {
        self.file_names.contains(file_name)
    }

    /// All entry names, pre-existing ones included, in archive order.
    pub fn entry_names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Stages an entry. Callers are responsible for making sure `name` is free.
    pub fn add_entry(&mut self, name: String, data: EntryData) {
        debug_assert!(!self.contains_entry(&name), "{name} added twice");
        trace!("Staging {name}");
        self.taken.insert(name.clone());
        if let Some(file_name) = last_component(&name) {
            self.file_names.insert(file_name);
        }
        self.names.push(name.clone());
        self.staged.push(StagedEntry { name, data });
    }

    /// Writes the archive to `path`, replacing whatever is there.
    pub fn save(mut self, path: &Utf8Path) -> ArchiveResult<()> {
        let directory = match path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        let temp = NamedTempFile::new_in(directory)?;
        let mut writer = ZipWriter::new(temp);

        if let Some(existing) = self.existing.as_mut() {
            for i in 0..existing.len() {
                let entry = existing.by_index_raw(i)?;
                trace!("Copying existing entry {}", entry.name());
                writer.raw_copy_file(entry)?;
            }
        }

        for entry in &self.staged {
            let size = entry.data.size()?;
            let options = file_options(self.zip64, self.password.as_deref(), size);
            debug!("Writing {} ({} bytes)", entry.name, size);
            writer.start_file(entry.name.as_str(), options)?;
            match &entry.data {
                EntryData::File(source) => {
                    let mut reader = File::open(source)?;
                    io::copy(&mut reader, &mut writer)?;
                }
                EntryData::Bytes(bytes) => writer.write_all(bytes)?,
            }
        }

        let temp = writer.finish()?;
        // Close our read handle before replacing the file it points to.
        drop(self.existing.take());
        temp.persist(path).map_err(|e| ArchiveError::Io(e.error))?;
        info!("Saved {path} with {} entries", self.names.len());
        Ok(())
    }
}

/// `a/b/c.txt` -> `c.txt`. Directory entries (`a/b/`) have none.
fn last_component(name: &str) -> Option<String> {
    name.rsplit('/')
        .next()
        .filter(|last| !last.is_empty())
        .map(str::to_owned)
}

fn file_options(zip64: Zip64Mode, password: Option<&str>, size: u64) -> FileOptions<'_, ()> {
    let large_file = match zip64 {
        Zip64Mode::Always => true,
        Zip64Mode::AsNecessary => size >= ZIP64_THRESHOLD,
        Zip64Mode::Never => false,
    };
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(large_file);
    match password {
        Some(password) => options.with_aes_encryption(AesMode::Aes256, password),
        None => options,
    }
}

/// What the extractor needs to know about an entry before reading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub index: usize,
    /// The name as stored in the archive
    pub name: String,
    pub is_dir: bool,
    /// `name` as a relative path, or `None` if it's absolute or climbs out with `..`
    pub enclosed_path: Option<Utf8PathBuf>,
}

/// A ZIP archive being read
pub struct ArchiveReader {
    archive: ZipArchive<File>,
    password: Option<String>,
}

impl ArchiveReader {
    /// Opens the archive at `path`. The password isn't checked until an
    /// encrypted entry is extracted.
    pub fn open(path: &Utf8Path, password: Option<&str>) -> ArchiveResult<Self> {
        let archive = ZipArchive::new(File::open(path)?)?;
        debug!("Opened {path} ({} entries)", archive.len());
        Ok(Self {
            archive,
            password: password.map(str::to_owned),
        })
    }

    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }

    /// Lists the archive's entries, in the order they're stored.
    pub fn entries(&mut self) -> ArchiveResult<Vec<EntryInfo>> {
        let mut entries = Vec::with_capacity(self.archive.len());
        for index in 0..self.archive.len() {
            // Raw access doesn't need the password.
            let file = self.archive.by_index_raw(index)?;
            let enclosed_path = file
                .enclosed_name()
                .and_then(|p| Utf8PathBuf::from_path_buf(p.to_path_buf()).ok());
            entries.push(EntryInfo {
                index,
                name: file.name().to_owned(),
                is_dir: file.is_dir(),
                enclosed_path,
            });
        }
        Ok(entries)
    }

    /// Decompresses `entry` into the writer returned by `open_sink`.
    ///
    /// `open_sink` is only called once the entry has been opened
    /// (and decrypted), so a bad password doesn't leave an empty file behind.
    /// Returns the number of bytes written.
    pub fn extract_entry<W, F>(&mut self, entry: &EntryInfo, open_sink: F) -> ArchiveResult<u64>
    where
        W: Write,
        F: FnOnce() -> ArchiveResult<W>,
    {
        let opened = match self.password.as_deref() {
            Some(password) => self
                .archive
                .by_index_decrypt(entry.index, password.as_bytes()),
            None => self.archive.by_index(entry.index),
        };
        let mut reader = opened.map_err(|e| password_error(e, &entry.name))?;
        let mut sink = open_sink()?;
        let written = io::copy(&mut reader, &mut sink)?;
        sink.flush()?;
        Ok(written)
    }
}

fn password_error(e: ZipError, entry: &str) -> ArchiveError {
    match e {
        ZipError::InvalidPassword => ArchiveError::BadPassword(entry.to_owned()),
        ZipError::UnsupportedArchive(msg) if msg == ZipError::PASSWORD_REQUIRED => {
            ArchiveError::BadPassword(entry.to_owned())
        }
        other => ArchiveError::Zip(other),
    }
}
