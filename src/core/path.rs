//! Normalized, slash-separated file paths
//!
//! `FilePath` is the only way to address content in a file system. Any input
//! string is accepted and normalized on construction:
//!
//! - Backslashes become `/`
//! - Runs of separators collapse to a single `/`
//! - Leading `/` and `./` are stripped
//! - Trailing `/` and `/.` are stripped
//!
//! The empty path addresses the root folder. Equality and ordering are plain
//! string comparisons on the normalized form, so sorting paths puts every
//! descendant of a folder in one contiguous run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical path separator.
pub const SEPARATOR: char = '/';

/// Immutable, normalized file path
///
/// # Examples
///
/// ```
/// use layered_vfs::FilePath;
///
/// let path = FilePath::of("\\data//images/logo.png");
/// assert_eq!(path.as_str(), "data/images/logo.png");
/// assert_eq!(path.name(), "logo.png");
/// assert_eq!(path.ext(), "png");
/// assert_eq!(path.parent(), Some(FilePath::of("data/images")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FilePath(String);

impl FilePath {
    /// Converts a path string to an equivalent normalized `FilePath`.
    pub fn of(raw: &str) -> Self {
        FilePath(normalize(raw))
    }

    /// The empty (root) path.
    pub fn empty() -> Self {
        FilePath(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the root path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Constructs a path relative to the folder represented by this path.
    pub fn resolve<P: AsRef<str>>(&self, relative: P) -> FilePath {
        let relative = relative.as_ref();
        if self.0.is_empty() {
            return FilePath::of(relative);
        }
        FilePath::of(&format!("{}{}{}", self.0, SEPARATOR, relative))
    }

    /// Strips this path as a folder prefix from `full`.
    ///
    /// If `full` is not located inside this folder it's returned unchanged.
    pub fn relativize(&self, full: &FilePath) -> FilePath {
        if !self.0.is_empty() {
            if let Some(rest) = full.0.strip_prefix(self.0.as_str()) {
                if let Some(rest) = rest.strip_prefix(SEPARATOR) {
                    return FilePath::of(rest);
                }
            }
        }
        full.clone()
    }

    /// Parent folder, or `None` if this path has no separator.
    pub fn parent(&self) -> Option<FilePath> {
        self.0
            .rfind(SEPARATOR)
            .map(|index| FilePath(self.0[..index].to_string()))
    }

    pub fn has_parent(&self) -> bool {
        self.0.contains(SEPARATOR)
    }

    /// The final (file name) component.
    pub fn name(&self) -> &str {
        match self.0.rfind(SEPARATOR) {
            Some(index) => &self.0[index + 1..],
            None => &self.0,
        }
    }

    /// File extension of the name, or `""` if there is none.
    ///
    /// A leading dot (`.hidden`) doesn't start an extension.
    pub fn ext(&self) -> &str {
        let name = self.name();
        match name.rfind('.') {
            Some(index) if index > 0 => &name[index + 1..],
            _ => "",
        }
    }

    /// Returns a new path with the file name's extension replaced.
    pub fn with_ext(&self, ext: &str) -> FilePath {
        let name = self.name();
        let stem = match name.rfind('.') {
            Some(index) if index > 0 => &name[..index],
            _ => name,
        };
        let renamed = format!("{}.{}", stem, ext);
        match self.parent() {
            Some(parent) => parent.resolve(renamed),
            None => FilePath::of(&renamed),
        }
    }

    /// String prefix test on the normalized form.
    pub fn starts_with<P: AsRef<str>>(&self, prefix: P) -> bool {
        self.0.starts_with(prefix.as_ref())
    }

    /// String suffix test on the normalized form.
    pub fn ends_with<P: AsRef<str>>(&self, suffix: P) -> bool {
        self.0.ends_with(suffix.as_ref())
    }

    /// Returns `true` if this path equals `folder` or lies somewhere below it.
    ///
    /// Unlike [`starts_with`](Self::starts_with) this respects component
    /// boundaries: `sub10` is not inside `sub1`.
    pub fn is_within(&self, folder: &FilePath) -> bool {
        if folder.is_empty() {
            return true;
        }
        match self.0.strip_prefix(folder.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with(SEPARATOR),
            None => false,
        }
    }

    /// Ancestor folders from the direct parent up to the top-level folder.
    pub fn ancestors(&self) -> impl Iterator<Item = FilePath> + '_ {
        self.0
            .char_indices()
            .rev()
            .filter(|(_, c)| *c == SEPARATOR)
            .map(move |(index, _)| FilePath(self.0[..index].to_string()))
    }
}

fn normalize(raw: &str) -> String {
    let mut path = String::with_capacity(raw.len());
    let mut previous_separator = false;
    for c in raw.chars() {
        if c == '/' || c == '\\' {
            if !previous_separator {
                path.push(SEPARATOR);
            }
            previous_separator = true;
        } else {
            path.push(c);
            previous_separator = false;
        }
    }

    loop {
        let before = path.len();

        if path.starts_with(SEPARATOR) {
            path.remove(0);
        } else if path.starts_with("./") {
            path.drain(..2);
        }

        if path.ends_with("/.") {
            path.truncate(path.len() - 2);
        } else if path.ends_with(SEPARATOR) {
            path.pop();
        }

        if path.len() == before {
            break;
        }
    }
    path
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FilePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FilePath {
    fn from(raw: &str) -> Self {
        FilePath::of(raw)
    }
}

impl From<String> for FilePath {
    fn from(raw: String) -> Self {
        FilePath::of(&raw)
    }
}

impl From<FilePath> for String {
    fn from(path: FilePath) -> Self {
        path.0
    }
}
