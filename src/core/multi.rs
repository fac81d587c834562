//! Ordered overlay of several file systems
//!
//! Reads go to the first member that has the file, so earlier members shadow
//! later ones. Searches merge the results of every open member.
//!
//! The overlay itself is always read-only. Writes go through
//! [`MultiFileSystem::writable_member`], which picks the first open,
//! writable member.

use crate::core::error::{Result, VfsError};
use crate::core::filesystem::{FileSystem, InputStream, Lifecycle, WritableFileSystem};
use crate::core::path::FilePath;
use crate::core::query::CollectQuery;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Read-only union of an ordered list of file systems
pub struct MultiFileSystem {
    members: Vec<Arc<dyn FileSystem>>,
    lifecycle: Lifecycle,
}

impl MultiFileSystem {
    pub fn new(members: Vec<Arc<dyn FileSystem>>) -> Self {
        debug!("Creating multi file system with {} members", members.len());
        MultiFileSystem {
            members,
            lifecycle: Lifecycle::new(),
        }
    }

    pub fn builder() -> MultiFileSystemBuilder {
        MultiFileSystemBuilder::new()
    }

    pub fn members(&self) -> &[Arc<dyn FileSystem>] {
        &self.members
    }

    /// The first open, non-read-only member with write support.
    pub fn writable_member(&self) -> Option<&dyn WritableFileSystem> {
        self.members
            .iter()
            .filter(|fs| fs.is_open() && !fs.is_read_only())
            .find_map(|fs| fs.as_writable())
    }

    /// Like [`writable_member`](Self::writable_member), failing with
    /// [`VfsError::NoWritableMember`] if there is none.
    pub fn require_writable_member(&self) -> Result<&dyn WritableFileSystem> {
        self.writable_member().ok_or(VfsError::NoWritableMember)
    }

    /// The first member containing `path`.
    fn find(&self, path: &FilePath) -> Result<&dyn FileSystem> {
        self.members
            .iter()
            .find(|fs| fs.file_exists(path))
            .map(|fs| fs.as_ref())
            .ok_or_else(|| VfsError::NotFound(path.clone()))
    }
}

impl std::fmt::Debug for MultiFileSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiFileSystem")
            .field("members", &self.members.len())
            .field("lifecycle", &self.lifecycle)
            .finish()
    }
}

impl FileSystem for MultiFileSystem {
    fn close(&self) {
        self.lifecycle.close(|| {
            for fs in &self.members {
                fs.close();
            }
            debug!("Closed multi file system");
        });
    }

    fn is_open(&self) -> bool {
        self.lifecycle.is_open()
    }

    fn is_read_only(&self) -> bool {
        true
    }

    fn is_folder(&self, path: &FilePath) -> bool {
        self.members.iter().any(|fs| fs.is_folder(path))
    }

    fn open_input_stream(&self, path: &FilePath) -> Result<InputStream> {
        self.find(path)?.open_input_stream(path)
    }

    fn file_exists(&self, path: &FilePath) -> bool {
        self.members.iter().any(|fs| fs.file_exists(path))
    }

    fn file_size(&self, path: &FilePath) -> Result<u64> {
        self.find(path)?.file_size(path)
    }

    fn modified_time(&self, path: &FilePath) -> Result<DateTime<Utc>> {
        self.find(path)?.modified_time(path)
    }

    fn collect(&self, query: &CollectQuery) -> Result<Vec<FilePath>> {
        let mut result = BTreeSet::new();
        for (index, fs) in self.members.iter().enumerate() {
            if !fs.is_open() {
                continue;
            }
            match fs.collect(query) {
                Ok(paths) => result.extend(paths),
                Err(e) => warn!("Skipping member {} during collect: {}", index, e),
            }
        }
        Ok(result.into_iter().collect())
    }
}

/// Builder for [`MultiFileSystem`]
///
/// Members are consulted in the order they are added.
#[derive(Default)]
pub struct MultiFileSystemBuilder {
    members: Vec<Arc<dyn FileSystem>>,
}

impl MultiFileSystemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a member, consulted after all previously added ones.
    pub fn layer<F: FileSystem + 'static>(mut self, fs: F) -> Self {
        self.members.push(Arc::new(fs));
        self
    }

    /// Append an already shared member.
    pub fn shared_layer(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.members.push(fs);
        self
    }

    pub fn build(self) -> MultiFileSystem {
        MultiFileSystem::new(self.members)
    }
}
