//! Directory-style search descriptions
//!
//! A [`CollectQuery`] names a base folder, whether to descend into
//! sub-folders, and which kinds of entries to report. Every backend answers
//! `collect` with the same predicate so that results agree across storage
//! types.

use crate::core::path::FilePath;

/// Describes a search for files and/or folders below a base folder.
///
/// # Examples
///
/// ```
/// use layered_vfs::{CollectQuery, FilePath};
///
/// let query = CollectQuery::files(FilePath::empty()).recursive(false);
/// assert!(query.accepts(&FilePath::of("valid.txt"), false));
/// assert!(!query.accepts(&FilePath::of("sub1/sub2/sub.txt"), false));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectQuery {
    /// Folder the search starts from. Never reported itself.
    pub prefix: FilePath,
    /// Candidate file names must start with this string.
    pub name_prefix: String,
    pub recursive: bool,
    pub collect_files: bool,
    pub collect_folders: bool,
}

impl Default for CollectQuery {
    /// A recursive, file-only search of the whole file system.
    fn default() -> Self {
        CollectQuery {
            prefix: FilePath::empty(),
            name_prefix: String::new(),
            recursive: true,
            collect_files: true,
            collect_folders: false,
        }
    }
}

impl CollectQuery {
    /// A recursive, file-only search below `prefix`.
    pub fn files(prefix: FilePath) -> Self {
        CollectQuery {
            prefix,
            ..Default::default()
        }
    }

    /// A recursive, file-only search for names starting with `name_prefix`.
    pub fn files_with_prefix(prefix: FilePath, name_prefix: impl Into<String>) -> Self {
        CollectQuery {
            prefix,
            name_prefix: name_prefix.into(),
            ..Default::default()
        }
    }

    /// A recursive, folder-only search below `prefix`.
    pub fn folders(prefix: FilePath) -> Self {
        CollectQuery {
            prefix,
            collect_files: false,
            collect_folders: true,
            ..Default::default()
        }
    }

    /// Alias of [`folders`](Self::folders).
    pub fn sub_folders(prefix: FilePath) -> Self {
        Self::folders(prefix)
    }

    /// A recursive search reporting both files and folders.
    pub fn all(prefix: FilePath) -> Self {
        CollectQuery {
            prefix,
            collect_folders: true,
            ..Default::default()
        }
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Location predicate.
    ///
    /// Recursive: `path` starts with the prefix string, so `sub10/a.txt`
    /// matches a `sub1` prefix. Non-recursive: `path` is the prefix or a
    /// direct child of it. Paths without a parent only match a root prefix.
    pub fn matches(&self, path: &FilePath) -> bool {
        if self.recursive {
            return path.starts_with(&self.prefix);
        }
        if path == &self.prefix {
            return true;
        }
        match path.parent() {
            Some(parent) => parent == self.prefix,
            None => self.prefix.is_empty(),
        }
    }

    /// Full result filter: location, name prefix and entry kind.
    ///
    /// The prefix folder itself is never accepted.
    pub fn accepts(&self, path: &FilePath, is_folder: bool) -> bool {
        if path == &self.prefix {
            return false;
        }
        if is_folder && !self.collect_folders {
            return false;
        }
        if !is_folder && !self.collect_files {
            return false;
        }
        path.name().starts_with(&self.name_prefix) && self.matches(path)
    }
}
