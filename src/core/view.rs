//! Sub-folder view onto another file system
//!
//! A `FileSystemView` exposes the content of one folder (`base`) of an inner
//! file system as if it were the root. Paths going in are resolved against the
//! base, paths coming out of `collect` are made relative to it again.
//!
//! The view is writable exactly when the inner file system is.

use crate::core::error::{Result, VfsError};
use crate::core::filesystem::{
    check_writable, FileSystem, InputStream, OutputStream, WritableFileSystem,
};
use crate::core::path::FilePath;
use crate::core::query::CollectQuery;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// File system restricted to a folder of another file system
///
/// # Examples
///
/// ```
/// use layered_vfs::{util, FilePath, FileSystem, FileSystemView, InMemoryFileSystem};
/// use std::sync::Arc;
///
/// # fn main() -> layered_vfs::Result<()> {
/// let inner = Arc::new(InMemoryFileSystem::new(false));
/// util::write_string(inner.as_ref(), &FilePath::of("base/a.txt"), "a")?;
///
/// let view = FileSystemView::new(inner, FilePath::of("base"));
/// assert!(view.file_exists(&FilePath::of("a.txt")));
/// # Ok(())
/// # }
/// ```
pub struct FileSystemView {
    inner: Arc<dyn FileSystem>,
    base: FilePath,
}

impl FileSystemView {
    pub fn new(inner: Arc<dyn FileSystem>, base: FilePath) -> Self {
        FileSystemView { inner, base }
    }

    pub fn base(&self) -> &FilePath {
        &self.base
    }

    pub fn inner(&self) -> &Arc<dyn FileSystem> {
        &self.inner
    }

    fn resolve(&self, path: &FilePath) -> FilePath {
        self.base.resolve(path)
    }

    fn writable_inner(&self) -> Result<&dyn WritableFileSystem> {
        self.inner.as_writable().ok_or(VfsError::ReadOnly)
    }
}

impl std::fmt::Debug for FileSystemView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSystemView")
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

impl FileSystem for FileSystemView {
    fn close(&self) {
        self.inner.close();
    }

    fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    fn is_read_only(&self) -> bool {
        self.inner.is_read_only() || self.inner.as_writable().is_none()
    }

    fn is_folder(&self, path: &FilePath) -> bool {
        self.inner.is_folder(&self.resolve(path))
    }

    fn open_input_stream(&self, path: &FilePath) -> Result<InputStream> {
        self.inner.open_input_stream(&self.resolve(path))
    }

    fn file_exists(&self, path: &FilePath) -> bool {
        self.inner.file_exists(&self.resolve(path))
    }

    fn file_size(&self, path: &FilePath) -> Result<u64> {
        self.inner.file_size(&self.resolve(path))
    }

    fn modified_time(&self, path: &FilePath) -> Result<DateTime<Utc>> {
        self.inner.modified_time(&self.resolve(path))
    }

    fn collect(&self, query: &CollectQuery) -> Result<Vec<FilePath>> {
        let inner_query = CollectQuery {
            prefix: self.resolve(&query.prefix),
            ..query.clone()
        };

        let result = self
            .inner
            .collect(&inner_query)?
            .into_iter()
            .filter(|path| path != &self.base && path.is_within(&self.base))
            .map(|path| self.base.relativize(&path))
            .collect();
        Ok(result)
    }

    fn as_writable(&self) -> Option<&dyn WritableFileSystem> {
        match self.inner.as_writable() {
            Some(_) => Some(self),
            None => None,
        }
    }
}

impl WritableFileSystem for FileSystemView {
    fn open_output_stream(&self, path: &FilePath, append: bool) -> Result<OutputStream> {
        check_writable(self)?;
        self.writable_inner()?
            .open_output_stream(&self.resolve(path), append)
    }

    fn delete(&self, path: &FilePath) -> Result<()> {
        check_writable(self)?;
        self.writable_inner()?.delete(&self.resolve(path))
    }

    fn rename(&self, src: &FilePath, dst: &FilePath) -> Result<()> {
        check_writable(self)?;
        self.writable_inner()?
            .rename(&self.resolve(src), &self.resolve(dst))
    }

    fn copy(&self, src: &FilePath, dst: &FilePath) -> Result<()> {
        check_writable(self)?;
        self.writable_inner()?
            .copy(&self.resolve(src), &self.resolve(dst))
    }
}
