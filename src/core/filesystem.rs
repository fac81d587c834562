//! Capability contracts shared by every backend
//!
//! Two capability sets exist:
//!
//! - [`FileSystem`]: read-only access (existence, size, modified time,
//!   input streams, searches) plus lifecycle (`close`, `is_open`).
//! - [`WritableFileSystem`]: adds output streams, delete, rename and copy.
//!
//! The behavior every backend shares lives in small free functions rather
//! than a base type: [`Lifecycle`] is the one-shot close guard,
//! [`check_writable`] is the read-only/closed guard run before any mutation,
//! and [`copy_by_stream`] is the default `copy`/`rename` implementation.
//!
//! # Streams
//!
//! Streams are boxed `Read`/`Write` trait objects. Dropping a stream releases
//! it. Output streams may buffer: call `flush()` before dropping to observe
//! write errors.

use crate::core::error::{Result, VfsError};
use crate::core::path::FilePath;
use crate::core::query::CollectQuery;
use chrono::{DateTime, Utc};
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};

/// Readable byte stream returned by [`FileSystem::open_input_stream`].
pub type InputStream = Box<dyn Read + Send>;

/// Writable byte stream returned by [`WritableFileSystem::open_output_stream`].
pub type OutputStream = Box<dyn Write + Send>;

/// A file system containing files and folders.
pub trait FileSystem: Send + Sync {
    /// Closes the file system. Calling this more than once has no effect.
    fn close(&self);

    fn is_open(&self) -> bool;

    fn is_read_only(&self) -> bool;

    /// Returns `true` if the path represents a folder.
    fn is_folder(&self, path: &FilePath) -> bool;

    /// Opens the file for reading.
    ///
    /// Fails with [`VfsError::NotFound`] if the file doesn't exist.
    fn open_input_stream(&self, path: &FilePath) -> Result<InputStream>;

    fn file_exists(&self, path: &FilePath) -> bool;

    /// File size in bytes.
    fn file_size(&self, path: &FilePath) -> Result<u64>;

    /// Last modified time, or the Unix epoch if the entry has no valid time.
    fn modified_time(&self, path: &FilePath) -> Result<DateTime<Utc>>;

    /// Searches for entries matching the query.
    fn collect(&self, query: &CollectQuery) -> Result<Vec<FilePath>>;

    /// Write access to this file system, if it supports any.
    fn as_writable(&self) -> Option<&dyn WritableFileSystem> {
        None
    }
}

/// A file system which allows modifications.
///
/// Every mutation fails with [`VfsError::ReadOnly`] when the file system is
/// read-only and with [`VfsError::Closed`] after `close()`.
pub trait WritableFileSystem: FileSystem {
    /// Opens a file for writing, creating it if needed.
    ///
    /// With `append` the stream continues after the existing content,
    /// otherwise existing content is discarded.
    fn open_output_stream(&self, path: &FilePath, append: bool) -> Result<OutputStream>;

    /// Deletes a file. Fails with [`VfsError::NotFound`] if it doesn't exist.
    fn delete(&self, path: &FilePath) -> Result<()>;

    /// Moves `src` to `dst`, overwriting `dst` if it exists.
    ///
    /// The default implementation copies, then deletes the source.
    fn rename(&self, src: &FilePath, dst: &FilePath) -> Result<()> {
        check_writable(self)?;
        copy_by_stream(self, src, dst)?;
        self.delete(src)
    }

    /// Copies `src` to `dst`, overwriting `dst` if it exists.
    fn copy(&self, src: &FilePath, dst: &FilePath) -> Result<()> {
        check_writable(self)?;
        copy_by_stream(self, src, dst)
    }
}

/// One-shot open/closed state.
#[derive(Debug, Default)]
pub struct Lifecycle {
    closed: AtomicBool,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the owner closed and runs `release` on the first call only.
    ///
    /// Returns `true` if this call performed the close.
    pub fn close<F: FnOnce()>(&self, release: F) -> bool {
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        release();
        true
    }

    pub fn is_open(&self) -> bool {
        !self.closed.load(Ordering::Acquire)
    }

    pub fn ensure_open(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(VfsError::Closed)
        }
    }
}

/// Guard run before every mutation.
pub fn check_writable<F: FileSystem + ?Sized>(fs: &F) -> Result<()> {
    if fs.is_read_only() {
        return Err(VfsError::ReadOnly);
    }
    if !fs.is_open() {
        return Err(VfsError::Closed);
    }
    Ok(())
}

/// Copies a file through an input and an output stream of the same file system.
pub fn copy_by_stream<F: WritableFileSystem + ?Sized>(
    fs: &F,
    src: &FilePath,
    dst: &FilePath,
) -> Result<()> {
    let mut input = fs.open_input_stream(src)?;
    let mut output = fs.open_output_stream(dst, false)?;
    io::copy(&mut input, &mut output)?;
    output.flush()?;
    Ok(())
}
