//! File system backed by regular OS files
//!
//! Every `FilePath` maps onto a real file below a fixed root folder. Folder
//! checks query the actual directory entries, and searches walk the
//! directory tree with `walkdir`.

use crate::core::error::{Result, VfsError};
use crate::core::filesystem::{
    check_writable, FileSystem, InputStream, Lifecycle, OutputStream, WritableFileSystem,
};
use crate::core::path::FilePath;
use crate::core::query::CollectQuery;
use chrono::{DateTime, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// OS-backed file system rooted at a folder
///
/// # Examples
///
/// ```rust,no_run
/// use layered_vfs::{util, FilePath, FileSystem, RegularFileSystem};
///
/// # fn main() -> layered_vfs::Result<()> {
/// let fs = RegularFileSystem::new("saves");
/// util::write_string(&fs, &FilePath::of("slot1/save.dat"), "progress")?;
/// assert!(fs.is_folder(&FilePath::of("slot1")));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RegularFileSystem {
    root: PathBuf,
    read_only: bool,
    lifecycle: Lifecycle,
}

impl RegularFileSystem {
    /// Create a writable file system rooted at `root`.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        let root = root.into();
        info!("Opening regular file system at {:?}", root);
        RegularFileSystem {
            root,
            read_only: false,
            lifecycle: Lifecycle::new(),
        }
    }

    /// Create a read-only file system rooted at `root`.
    pub fn read_only<P: Into<PathBuf>>(root: P) -> Self {
        let mut fs = Self::new(root);
        fs.read_only = true;
        fs
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &FilePath) -> PathBuf {
        if path.is_empty() {
            self.root.clone()
        } else {
            self.root.join(path.as_str())
        }
    }

    fn resolve_existing(&self, path: &FilePath) -> Result<PathBuf> {
        let file = self.resolve(path);
        if !file.exists() {
            return Err(VfsError::NotFound(path.clone()));
        }
        Ok(file)
    }

    fn ensure_parent(file: &Path) -> Result<()> {
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl FileSystem for RegularFileSystem {
    fn close(&self) {
        self.lifecycle
            .close(|| info!("Closed regular file system at {:?}", self.root));
    }

    fn is_open(&self) -> bool {
        self.lifecycle.is_open()
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn is_folder(&self, path: &FilePath) -> bool {
        self.resolve(path).is_dir()
    }

    fn open_input_stream(&self, path: &FilePath) -> Result<InputStream> {
        let file = File::open(self.resolve_existing(path)?)?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn file_exists(&self, path: &FilePath) -> bool {
        self.resolve(path).exists()
    }

    fn file_size(&self, path: &FilePath) -> Result<u64> {
        Ok(fs::metadata(self.resolve_existing(path)?)?.len())
    }

    fn modified_time(&self, path: &FilePath) -> Result<DateTime<Utc>> {
        let modified = fs::metadata(self.resolve_existing(path)?)?.modified()?;
        Ok(DateTime::<Utc>::from(modified))
    }

    fn collect(&self, query: &CollectQuery) -> Result<Vec<FilePath>> {
        let base_folder = self.resolve(&query.prefix);
        if !base_folder.is_dir() {
            // A non-folder prefix can only match itself, and the prefix is never reported
            return Ok(Vec::new());
        }

        let max_depth = if query.recursive { usize::MAX } else { 1 };
        let mut result = Vec::new();
        for entry in WalkDir::new(&base_folder)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
        {
            let entry = entry.map_err(io::Error::from)?;
            let relative = entry
                .path()
                .strip_prefix(&base_folder)
                .map_err(io::Error::other)?;
            let path = query.prefix.resolve(relative.to_string_lossy());
            if query.accepts(&path, entry.file_type().is_dir()) {
                result.push(path);
            }
        }
        Ok(result)
    }

    fn as_writable(&self) -> Option<&dyn WritableFileSystem> {
        Some(self)
    }
}

impl WritableFileSystem for RegularFileSystem {
    fn open_output_stream(&self, path: &FilePath, append: bool) -> Result<OutputStream> {
        check_writable(self)?;
        let file = self.resolve(path);
        if file.is_dir() {
            return Err(VfsError::IsFolder(path.clone()));
        }
        Self::ensure_parent(&file)?;

        debug!("Opening {} for writing (append: {})", path, append);
        let mut options = OpenOptions::new();
        options.create(true);
        if append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }
        Ok(Box::new(BufWriter::new(options.open(file)?)))
    }

    fn delete(&self, path: &FilePath) -> Result<()> {
        check_writable(self)?;
        let file = self.resolve_existing(path)?;
        debug!("Deleting {}", path);

        if file.is_dir() {
            fs::remove_dir(&file)?;
        } else {
            fs::remove_file(&file)?;
        }

        if file.exists() {
            return Err(VfsError::Io(io::Error::other(format!(
                "Error deleting file: {}",
                path
            ))));
        }
        Ok(())
    }

    fn rename(&self, src: &FilePath, dst: &FilePath) -> Result<()> {
        check_writable(self)?;
        let src_file = self.resolve_existing(src)?;
        let dst_file = self.resolve(dst);
        Self::ensure_parent(&dst_file)?;

        debug!("Renaming {} to {}", src, dst);
        fs::rename(src_file, dst_file)?;
        Ok(())
    }

    fn copy(&self, src: &FilePath, dst: &FilePath) -> Result<()> {
        check_writable(self)?;
        let src_file = self.resolve_existing(src)?;
        let dst_file = self.resolve(dst);
        Self::ensure_parent(&dst_file)?;

        debug!("Copying {} to {}", src, dst);
        fs::copy(src_file, dst_file)?;
        Ok(())
    }
}
