//! Pure in-process file system
//!
//! Files live in a map keyed by path. There are no folder objects: whenever a
//! file is written, all of its ancestors are recorded in a set of known
//! folders, and `is_folder` is exactly membership in that set (the root is
//! always a folder).
//!
//! Known folders are never retracted. Deleting the last file below a folder
//! leaves the folder known for the lifetime of the file system.
//!
//! The file map and the folder set sit behind a single `parking_lot::Mutex`,
//! shared with open output streams so they can commit their content.

use crate::core::error::{Result, VfsError};
use crate::core::filesystem::{
    check_writable, FileSystem, InputStream, Lifecycle, OutputStream, WritableFileSystem,
};
use crate::core::path::FilePath;
use crate::core::query::CollectQuery;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::io::{self, Cursor, Write};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
struct MemoryFile {
    content: Arc<[u8]>,
    modified: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    files: HashMap<FilePath, MemoryFile>,
    folders: HashSet<FilePath>,
}

impl MemoryState {
    fn is_folder(&self, path: &FilePath) -> bool {
        path.is_empty() || self.folders.contains(path)
    }

    fn file(&self, path: &FilePath) -> Result<&MemoryFile> {
        self.files
            .get(path)
            .ok_or_else(|| VfsError::NotFound(path.clone()))
    }

    /// Rejects folder targets and records the target's ancestors as folders.
    fn prepare_write(&mut self, path: &FilePath) -> Result<()> {
        if self.is_folder(path) {
            return Err(VfsError::IsFolder(path.clone()));
        }
        for ancestor in path.ancestors() {
            if !self.folders.insert(ancestor) {
                break; // Higher ancestors were recorded with this one
            }
        }
        Ok(())
    }

    fn store(&mut self, path: &FilePath, content: Arc<[u8]>) {
        let file = MemoryFile {
            content,
            modified: Utc::now(),
        };
        self.files.insert(path.clone(), file);
    }
}

/// In-memory file system
///
/// # Examples
///
/// ```
/// use layered_vfs::{util, FilePath, FileSystem, InMemoryFileSystem};
///
/// # fn main() -> layered_vfs::Result<()> {
/// let fs = InMemoryFileSystem::new(false);
/// util::write_string(&fs, &FilePath::of("sub1/sub2/sub.txt"), "hello")?;
///
/// assert!(fs.is_folder(&FilePath::of("sub1/sub2")));
/// assert_eq!(util::read_string(&fs, &FilePath::of("sub1/sub2/sub.txt"))?, "hello");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct InMemoryFileSystem {
    state: Arc<Mutex<MemoryState>>,
    read_only: bool,
    lifecycle: Lifecycle,
}

impl InMemoryFileSystem {
    pub fn new(read_only: bool) -> Self {
        InMemoryFileSystem {
            state: Arc::new(Mutex::new(MemoryState::default())),
            read_only,
            lifecycle: Lifecycle::new(),
        }
    }

    /// Create a file system holding the given files.
    ///
    /// This is the only way to give a read-only instance content.
    pub fn preloaded<I, C>(files: I, read_only: bool) -> Result<Self>
    where
        I: IntoIterator<Item = (FilePath, C)>,
        C: Into<Vec<u8>>,
    {
        let fs = Self::new(read_only);
        {
            let mut state = fs.state.lock();
            for (path, content) in files {
                state.prepare_write(&path)?;
                let content: Vec<u8> = content.into();
                state.store(&path, Arc::from(content));
            }
        }
        Ok(fs)
    }

    /// Number of stored files.
    pub fn file_count(&self) -> usize {
        self.state.lock().files.len()
    }
}

impl FileSystem for InMemoryFileSystem {
    fn close(&self) {
        self.lifecycle.close(|| debug!("Closed in-memory file system"));
    }

    fn is_open(&self) -> bool {
        self.lifecycle.is_open()
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn is_folder(&self, path: &FilePath) -> bool {
        self.state.lock().is_folder(path)
    }

    fn open_input_stream(&self, path: &FilePath) -> Result<InputStream> {
        let state = self.state.lock();
        let content = Arc::clone(&state.file(path)?.content);
        Ok(Box::new(Cursor::new(content)))
    }

    fn file_exists(&self, path: &FilePath) -> bool {
        self.state.lock().files.contains_key(path)
    }

    fn file_size(&self, path: &FilePath) -> Result<u64> {
        Ok(self.state.lock().file(path)?.content.len() as u64)
    }

    fn modified_time(&self, path: &FilePath) -> Result<DateTime<Utc>> {
        Ok(self.state.lock().file(path)?.modified)
    }

    fn collect(&self, query: &CollectQuery) -> Result<Vec<FilePath>> {
        let state = self.state.lock();

        let mut result = BTreeSet::new();
        for path in state.files.keys() {
            if !path.starts_with(&query.prefix) {
                continue;
            }
            if query.accepts(path, false) {
                result.insert(path.clone());
            }
            if query.collect_folders {
                for folder in path.ancestors() {
                    if !folder.starts_with(&query.prefix) {
                        break;
                    }
                    if query.accepts(&folder, true) {
                        result.insert(folder);
                    }
                }
            }
        }
        Ok(result.into_iter().collect())
    }

    fn as_writable(&self) -> Option<&dyn WritableFileSystem> {
        Some(self)
    }
}

impl WritableFileSystem for InMemoryFileSystem {
    fn open_output_stream(&self, path: &FilePath, append: bool) -> Result<OutputStream> {
        check_writable(self)?;

        let mut state = self.state.lock();
        state.prepare_write(path)?;

        let existing = match state.files.get(path) {
            Some(file) if append => Some(file.content.to_vec()),
            _ => None,
        };
        let buffer = match existing {
            Some(content) => content,
            None => {
                state.store(path, Arc::from(Vec::<u8>::new()));
                Vec::new()
            }
        };

        debug!("Opening {} for writing (append: {})", path, append);
        Ok(Box::new(MemoryOutputStream {
            state: Arc::clone(&self.state),
            path: path.clone(),
            buffer,
            dirty: false,
        }))
    }

    fn delete(&self, path: &FilePath) -> Result<()> {
        check_writable(self)?;
        let mut state = self.state.lock();
        if state.files.remove(path).is_none() {
            return Err(VfsError::NotFound(path.clone()));
        }
        debug!("Deleted {}", path);
        Ok(())
    }

    fn rename(&self, src: &FilePath, dst: &FilePath) -> Result<()> {
        check_writable(self)?;
        let mut state = self.state.lock();
        let content = Arc::clone(&state.file(src)?.content);
        if src == dst {
            return Ok(());
        }
        state.prepare_write(dst)?;
        state.store(dst, content);
        state.files.remove(src);
        debug!("Renamed {} to {}", src, dst);
        Ok(())
    }

    fn copy(&self, src: &FilePath, dst: &FilePath) -> Result<()> {
        check_writable(self)?;
        let mut state = self.state.lock();
        let content = Arc::clone(&state.file(src)?.content);
        if src == dst {
            return Ok(());
        }
        state.prepare_write(dst)?;
        state.store(dst, content);
        debug!("Copied {} to {}", src, dst);
        Ok(())
    }
}

/// Buffers written bytes and publishes them on `flush()` and on drop.
struct MemoryOutputStream {
    state: Arc<Mutex<MemoryState>>,
    path: FilePath,
    buffer: Vec<u8>,
    dirty: bool,
}

impl MemoryOutputStream {
    fn commit(&mut self) {
        if self.dirty {
            let content: Arc<[u8]> = Arc::from(self.buffer.as_slice());
            self.state.lock().store(&self.path, content);
            self.dirty = false;
        }
    }
}

impl Write for MemoryOutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        self.dirty = true;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.commit();
        Ok(())
    }
}

impl Drop for MemoryOutputStream {
    fn drop(&mut self) {
        self.commit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::util;

    fn p(s: &str) -> FilePath {
        FilePath::of(s)
    }

    fn populated() -> InMemoryFileSystem {
        let fs = InMemoryFileSystem::new(false);
        util::write_string(&fs, &p("valid.txt"), "test").unwrap();
        util::write_string(&fs, &p("sub1/sub2/sub.txt"), "sub").unwrap();
        fs
    }

    #[test]
    fn test_folders_are_synthesized_from_writes() {
        let fs = populated();
        assert!(fs.is_folder(&FilePath::empty()));
        assert!(fs.is_folder(&p("sub1")));
        assert!(fs.is_folder(&p("sub1/sub2")));
        assert!(!fs.is_folder(&p("sub1/sub2/sub.txt")));
        assert!(!fs.is_folder(&p("valid.txt")));
    }

    #[test]
    fn test_write_to_known_folder_fails() {
        let fs = populated();
        let result = fs.open_output_stream(&p("sub1"), false);
        assert!(matches!(result, Err(VfsError::IsFolder(_))));
        let result = fs.open_output_stream(&FilePath::empty(), false);
        assert!(matches!(result, Err(VfsError::IsFolder(_))));
    }

    #[test]
    fn test_folders_persist_after_delete() {
        let fs = populated();
        fs.delete(&p("sub1/sub2/sub.txt")).unwrap();

        assert!(!fs.file_exists(&p("sub1/sub2/sub.txt")));
        // Known folders are never retracted
        assert!(fs.is_folder(&p("sub1")));
        assert!(fs.is_folder(&p("sub1/sub2")));
    }

    #[test]
    fn test_stream_content_visible_after_flush() {
        let fs = InMemoryFileSystem::new(false);
        let mut out = fs.open_output_stream(&p("a.txt"), false).unwrap();
        out.write_all(b"hello").unwrap();
        assert!(fs.file_exists(&p("a.txt")));
        assert_eq!(fs.file_size(&p("a.txt")).unwrap(), 0);

        out.flush().unwrap();
        assert_eq!(fs.file_size(&p("a.txt")).unwrap(), 5);

        out.write_all(b" world").unwrap();
        drop(out);
        assert_eq!(util::read_string(&fs, &p("a.txt")).unwrap(), "hello world");
    }

    #[test]
    fn test_truncate_on_open() {
        let fs = populated();
        let out = fs.open_output_stream(&p("valid.txt"), false).unwrap();
        drop(out);
        assert_eq!(fs.file_size(&p("valid.txt")).unwrap(), 0);
    }

    #[test]
    fn test_read_only_preloaded() {
        let fs = InMemoryFileSystem::preloaded(vec![(p("a/b.txt"), "old")], true).unwrap();
        assert!(fs.is_read_only());
        assert!(fs.is_folder(&p("a")));
        assert_eq!(util::read_string(&fs, &p("a/b.txt")).unwrap(), "old");
        assert!(matches!(
            fs.open_output_stream(&p("c.txt"), false),
            Err(VfsError::ReadOnly)
        ));
    }

    #[test]
    fn test_closed_rejects_mutation() {
        let fs = populated();
        fs.close();
        fs.close();
        assert!(!fs.is_open());
        assert!(matches!(fs.delete(&p("valid.txt")), Err(VfsError::Closed)));
    }

    #[test]
    fn test_rename_onto_itself_keeps_file() {
        let fs = populated();
        fs.rename(&p("valid.txt"), &p("valid.txt")).unwrap();
        assert_eq!(util::read_string(&fs, &p("valid.txt")).unwrap(), "test");
    }

    #[test]
    fn test_collect_with_folders_below_prefix() {
        let fs = populated();
        util::write_string(&fs, &p("sub1/sub3/x.txt"), "x").unwrap();

        let result = fs.collect(&CollectQuery::all(p("sub1"))).unwrap();
        assert_eq!(
            result,
            vec![
                p("sub1/sub2"),
                p("sub1/sub2/sub.txt"),
                p("sub1/sub3"),
                p("sub1/sub3/x.txt"),
            ]
        );
    }

    #[test]
    fn test_recursive_collect_uses_string_prefix() {
        let fs = InMemoryFileSystem::new(false);
        util::write_string(&fs, &p("sub1/a.txt"), "a").unwrap();
        util::write_string(&fs, &p("sub10/b.txt"), "b").unwrap();

        let files = fs.collect(&CollectQuery::files(p("sub1"))).unwrap();
        assert_eq!(files, vec![p("sub1/a.txt"), p("sub10/b.txt")]);

        let folders = fs.collect(&CollectQuery::folders(p("sub1"))).unwrap();
        assert_eq!(folders, vec![p("sub10")]);
    }
}
