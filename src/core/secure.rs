//! Crash-safe file replacement
//!
//! New content is first written to a shadow file (`<path>.bak`). Only when the
//! caller commits is the main file deleted and the shadow renamed over it. At
//! every point in between either the main file or the shadow holds complete
//! content, and [`SecureFileWriter::read`] picks whichever is valid.
//!
//! Always read files written this way through [`SecureFileWriter::read`].

use crate::core::error::Result;
use crate::core::filesystem::{InputStream, OutputStream, WritableFileSystem};
use crate::core::path::FilePath;
use std::io::{self, Write};
use tracing::debug;

/// Suffix appended to a path to form its shadow path.
pub const SHADOW_SUFFIX: &str = ".bak";

/// Atomic writer on top of a writable file system
///
/// # Examples
///
/// ```
/// use layered_vfs::{FilePath, InMemoryFileSystem, SecureFileWriter};
/// use std::io::{Read, Write};
///
/// # fn main() -> layered_vfs::Result<()> {
/// let fs = InMemoryFileSystem::new(false);
/// let writer = SecureFileWriter::new(&fs);
/// let path = FilePath::of("save.dat");
///
/// let mut out = writer.write(&path, false)?;
/// out.write_all(b"progress")?;
/// out.commit()?;
///
/// let mut text = String::new();
/// writer.read(&path)?.read_to_string(&mut text)?;
/// assert_eq!(text, "progress");
/// # Ok(())
/// # }
/// ```
pub struct SecureFileWriter<'a> {
    fs: &'a dyn WritableFileSystem,
}

impl<'a> SecureFileWriter<'a> {
    pub fn new(fs: &'a dyn WritableFileSystem) -> Self {
        SecureFileWriter { fs }
    }

    /// The shadow file used while `path` is being written.
    pub fn shadow_path(path: &FilePath) -> FilePath {
        FilePath::of(&format!("{}{}", path, SHADOW_SUFFIX))
    }

    /// Opens the committed content of `path`.
    ///
    /// Reads the main file if it exists and isn't empty, otherwise the shadow.
    pub fn read(&self, path: &FilePath) -> Result<InputStream> {
        if self.is_main_file_ok(path) {
            return self.fs.open_input_stream(path);
        }
        self.fs.open_input_stream(&Self::shadow_path(path))
    }

    /// Starts writing new content for `path`.
    ///
    /// Nothing replaces the main file until [`SecureOutputStream::commit`].
    /// With `append` the new content continues after the current content.
    ///
    /// If an earlier commit was interrupted after the main file was removed,
    /// the shadow still holds the committed content and is promoted first.
    pub fn write(&self, path: &FilePath, append: bool) -> Result<SecureOutputStream<'a>> {
        let shadow = Self::shadow_path(path);
        if !self.is_main_file_ok(path) && self.fs.file_exists(&shadow) {
            debug!("Recovering {} from shadow {}", path, shadow);
            promote(self.fs, &shadow, path)?;
        }
        if append && self.fs.file_exists(path) {
            self.fs.copy(path, &shadow)?;
        }

        debug!("Writing {} through shadow {}", path, shadow);
        let inner = self.fs.open_output_stream(&shadow, append)?;
        Ok(SecureOutputStream {
            fs: self.fs,
            path: path.clone(),
            shadow,
            inner,
        })
    }

    /// Returns `true` if the main file exists and isn't empty.
    pub fn is_main_file_ok(&self, path: &FilePath) -> bool {
        self.fs.file_exists(path) && self.fs.file_size(path).is_ok_and(|size| size > 0)
    }
}

/// Output stream writing to the shadow file
///
/// Dropping the stream without calling [`commit`](Self::commit) leaves the
/// main file untouched.
pub struct SecureOutputStream<'a> {
    fs: &'a dyn WritableFileSystem,
    path: FilePath,
    shadow: FilePath,
    inner: OutputStream,
}

impl<'a> SecureOutputStream<'a> {
    /// Closes the shadow stream and promotes the shadow to the main path.
    pub fn commit(self) -> Result<()> {
        let SecureOutputStream {
            fs,
            path,
            shadow,
            mut inner,
        } = self;

        inner.flush()?;
        drop(inner);

        promote(fs, &shadow, &path)?;
        debug!("Promoted {} to {}", shadow, path);
        Ok(())
    }
}

/// Replaces `path` with `shadow`.
fn promote(fs: &dyn WritableFileSystem, shadow: &FilePath, path: &FilePath) -> Result<()> {
    if fs.file_exists(path) {
        fs.delete(path)?;
    }
    fs.rename(shadow, path)
}

impl Write for SecureOutputStream<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
