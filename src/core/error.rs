use crate::core::path::FilePath;
use thiserror::Error;

/// File system operation errors
#[derive(Error, Debug)]
pub enum VfsError {
    /// Path does not exist
    #[error("File not found: {0}")]
    NotFound(FilePath),

    /// Mutation attempted on a read-only file system
    #[error("FileSystem is read-only")]
    ReadOnly,

    /// Mutation attempted after close
    #[error("FileSystem is closed")]
    Closed,

    /// Output stream requested for a folder
    #[error("Cannot write: {0} is a folder")]
    IsFolder(FilePath),

    /// Overlay has no member that accepts writes
    #[error("No open, writable member file system available")]
    NoWritableMember,

    /// Invalid argument or malformed record
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Archive container could not be read
    #[error("Archive error: {0}")]
    Archive(String),

    /// Overlay configuration is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VfsError {
    /// Returns `true` if this error means the requested path doesn't exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            VfsError::NotFound(_) => true,
            VfsError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

impl From<zip::result::ZipError> for VfsError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => VfsError::Io(e),
            other => VfsError::Archive(other.to_string()),
        }
    }
}

impl From<toml::de::Error> for VfsError {
    fn from(err: toml::de::Error) -> Self {
        VfsError::Config(err.to_string())
    }
}

/// File system operation result type
pub type Result<T> = std::result::Result<T, VfsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        assert!(VfsError::NotFound(FilePath::of("a.txt")).is_not_found());
        assert!(VfsError::Io(std::io::Error::from(std::io::ErrorKind::NotFound)).is_not_found());
        assert!(!VfsError::NoWritableMember.is_not_found());
        assert!(!VfsError::ReadOnly.is_not_found());
    }

    #[test]
    fn test_messages() {
        assert_eq!(VfsError::Closed.to_string(), "FileSystem is closed");
        assert_eq!(
            VfsError::IsFolder(FilePath::of("sub")).to_string(),
            "Cannot write: sub is a folder"
        );
    }
}
