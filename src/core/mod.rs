//! Virtual file system core
//!
//! - [`path`] - Normalized `/`-separated paths
//! - [`query`] - Search descriptions for `collect`
//! - [`filesystem`] - The `FileSystem` / `WritableFileSystem` contracts
//! - Backends:
//!   - [`regular`] - OS files below a root folder
//!   - [`memory`] - Pure in-process storage
//!   - [`archive`] - Sorted, read-only index over a ZIP container
//! - Decorators:
//!   - [`view`] - One folder of another file system presented as the root
//!   - [`multi`] - Ordered read-only overlay of several file systems
//!   - [`secure`] - Crash-safe replacement of files through a shadow copy
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │ MultiFileSystem (read-only, first match wins) │
//! ├───────────────┬───────────────┬───────────────┤
//! │ FileSystemView│ Archive       │ Regular       │
//! │  └ InMemory   │  └ ZipSource  │  └ OS folder  │
//! └───────────────┴───────────────┴───────────────┘
//!             SecureFileWriter ──> any WritableFileSystem
//! ```

pub mod archive;
pub mod error;
pub mod filesystem;
pub mod memory;
pub mod multi;
pub mod path;
pub mod query;
pub mod regular;
pub mod secure;
pub mod util;
pub mod view;

// Re-export commonly used types
pub use archive::{ArchiveFileSystem, ArchiveRecord, ArchiveSource, CompressionMethod, ZipSource};
pub use error::{Result, VfsError};
pub use filesystem::{FileSystem, InputStream, OutputStream, WritableFileSystem};
pub use memory::InMemoryFileSystem;
pub use multi::{MultiFileSystem, MultiFileSystemBuilder};
pub use path::FilePath;
pub use query::CollectQuery;
pub use regular::RegularFileSystem;
pub use secure::{SecureFileWriter, SecureOutputStream};
pub use view::FileSystemView;
