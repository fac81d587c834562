//! Read-only file system over an archive container
//!
//! On open the container parser ([`ArchiveSource`]) lists every entry once.
//! The records are sorted by path and kept as the index:
//!
//! - Lookups binary-search the index
//! - `collect` binary-searches the insertion point of the query prefix and
//!   scans forward while records still share it, since sorting keeps every
//!   path with a common prefix in one contiguous run
//!
//! Entry bytes are extracted (and decompressed) by the parser, which owns the
//! backing handle. The handle is released on `close()`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use layered_vfs::{util, ArchiveFileSystem, FilePath, FileSystem};
//!
//! # fn main() -> layered_vfs::Result<()> {
//! let archive = ArchiveFileSystem::open("data/base.zip")?;
//! for record in archive.records() {
//!     println!("{} ({} bytes)", record.path(), record.uncompressed_length());
//! }
//! let text = util::read_string(&archive, &FilePath::of("script/main.lua"))?;
//! archive.close();
//! # Ok(())
//! # }
//! ```

mod record;
mod zip_source;

pub use record::{decode_packed_time, encode_packed_time, ArchiveRecord, CompressionMethod};
pub use zip_source::ZipSource;

use crate::core::error::{Result, VfsError};
use crate::core::filesystem::{FileSystem, InputStream, Lifecycle};
use crate::core::path::FilePath;
use crate::core::query::CollectQuery;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Container parser and random-access handle for one archive
pub trait ArchiveSource: Send {
    /// Lists every entry of the container, in any order.
    fn read_records(&mut self) -> Result<Vec<ArchiveRecord>>;

    /// Reads the complete (decompressed) content of an entry.
    ///
    /// Fails with an `UnexpectedEof` I/O error if the container holds fewer
    /// bytes than the record promises.
    fn open_record(&mut self, record: &ArchiveRecord) -> Result<Vec<u8>>;

    /// Byte offset of the entry's data within the container.
    fn data_offset(&mut self, record: &ArchiveRecord) -> Result<u64>;
}

/// Read-only, binary-searchable file system over an archive
pub struct ArchiveFileSystem {
    records: Vec<ArchiveRecord>,
    source: Mutex<Option<Box<dyn ArchiveSource>>>,
    lifecycle: Lifecycle,
    backing_file: Option<PathBuf>,
}

impl ArchiveFileSystem {
    /// Open a ZIP archive from the OS file system.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening archive {:?}", path);

        let file = File::open(path)?;
        let mut archive = Self::from_reader(BufReader::new(file))?;
        archive.backing_file = Some(path.to_path_buf());
        Ok(archive)
    }

    /// Open a ZIP archive from any seekable handle, e.g. an in-memory `Cursor`.
    pub fn from_reader<R: Read + Seek + Send + 'static>(reader: R) -> Result<Self> {
        Self::from_source(Box::new(ZipSource::new(reader)?))
    }

    /// Open an archive using a custom container parser.
    pub fn from_source(mut source: Box<dyn ArchiveSource>) -> Result<Self> {
        let mut records = source.read_records()?;
        records.sort_by(|a, b| a.path().cmp(b.path()));
        debug!("Indexed {} archive records", records.len());

        Ok(ArchiveFileSystem {
            records,
            source: Mutex::new(Some(source)),
            lifecycle: Lifecycle::new(),
            backing_file: None,
        })
    }

    /// All records, sorted by path.
    pub fn records(&self) -> &[ArchiveRecord] {
        &self.records
    }

    /// The record for `path`, if the archive contains it.
    pub fn record(&self, path: &FilePath) -> Option<&ArchiveRecord> {
        self.records
            .binary_search_by(|record| record.path().cmp(path))
            .ok()
            .map(|index| &self.records[index])
    }

    fn require_record(&self, path: &FilePath) -> Result<&ArchiveRecord> {
        self.record(path)
            .ok_or_else(|| VfsError::NotFound(path.clone()))
    }

    /// Byte offset of the file's data within the archive.
    pub fn file_offset(&self, path: &FilePath) -> Result<u64> {
        let record = self.require_record(path)?;
        self.with_source(|source| source.data_offset(record))
    }

    /// The OS file this archive was opened from, if any.
    pub fn backing_file(&self) -> Option<&Path> {
        self.backing_file.as_deref()
    }

    fn with_source<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn ArchiveSource) -> Result<T>,
    {
        let mut source = self.source.lock();
        match source.as_mut() {
            Some(source) => f(source.as_mut()),
            None => Err(VfsError::Closed),
        }
    }
}

impl std::fmt::Debug for ArchiveFileSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveFileSystem")
            .field("records", &self.records.len())
            .field("backing_file", &self.backing_file)
            .field("lifecycle", &self.lifecycle)
            .finish()
    }
}

impl FileSystem for ArchiveFileSystem {
    fn close(&self) {
        self.lifecycle.close(|| {
            self.source.lock().take();
            info!("Closed archive {:?}", self.backing_file);
        });
    }

    fn is_open(&self) -> bool {
        self.lifecycle.is_open()
    }

    fn is_read_only(&self) -> bool {
        true
    }

    fn is_folder(&self, path: &FilePath) -> bool {
        path.is_empty() || self.record(path).is_some_and(|record| record.is_folder())
    }

    fn open_input_stream(&self, path: &FilePath) -> Result<InputStream> {
        let record = self.require_record(path)?;
        let bytes = self.with_source(|source| source.open_record(record))?;
        Ok(Box::new(Cursor::new(bytes)))
    }

    fn file_exists(&self, path: &FilePath) -> bool {
        self.record(path).is_some()
    }

    fn file_size(&self, path: &FilePath) -> Result<u64> {
        Ok(self.require_record(path)?.uncompressed_length())
    }

    fn modified_time(&self, path: &FilePath) -> Result<DateTime<Utc>> {
        Ok(self.require_record(path)?.modified_time())
    }

    fn collect(&self, query: &CollectQuery) -> Result<Vec<FilePath>> {
        let prefix = &query.prefix;
        let start = self
            .records
            .partition_point(|record| record.path() < prefix);

        let result = self.records[start..]
            .iter()
            .take_while(|record| record.path().starts_with(prefix))
            .filter(|record| query.accepts(record.path(), record.is_folder()))
            .map(|record| record.path().clone())
            .collect();
        Ok(result)
    }
}
