//! # Layered VFS - Backend-Agnostic Virtual File System
//!
//! `layered-vfs` gives every kind of storage the same small interface so that
//! application code can read and write files without knowing where they live:
//!
//! - **Regular** OS folders and **in-memory** storage, both writable
//! - **Archives** (ZIP) with a sorted, binary-searchable index
//! - **Views** restricting another file system to one of its folders
//! - **Overlays** stacking several file systems, first match wins
//! - **Crash-safe writes** through a `.bak` shadow file
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use layered_vfs::{
//!     util, ArchiveFileSystem, CollectQuery, FilePath, FileSystem, MultiFileSystem,
//!     RegularFileSystem, Result,
//! };
//!
//! # fn main() -> Result<()> {
//! // Saved files shadow the files shipped in the archive
//! let fs = MultiFileSystem::builder()
//!     .layer(RegularFileSystem::new("saves"))
//!     .layer(ArchiveFileSystem::open("data/base.zip")?)
//!     .build();
//!
//! let script = util::read_string(&fs, &FilePath::of("script/main.lua"))?;
//!
//! // List every file below "images"
//! for path in fs.collect(&CollectQuery::files(FilePath::of("images")))? {
//!     println!("{} ({} bytes)", path, fs.file_size(&path)?);
//! }
//!
//! // Writes go to the first writable layer
//! let saves = fs.require_writable_member()?;
//! util::write_string(saves, &FilePath::of("slot1/save.dat"), &script)?;
//!
//! fs.close();
//! # Ok(())
//! # }
//! ```
//!
//! ## Crash-Safe Writes
//!
//! ```rust,no_run
//! use layered_vfs::{FilePath, RegularFileSystem, Result, SecureFileWriter};
//! use std::io::Write;
//!
//! # fn main() -> Result<()> {
//! let fs = RegularFileSystem::new("saves");
//! let writer = SecureFileWriter::new(&fs);
//!
//! let mut out = writer.write(&FilePath::of("slot1/save.dat"), false)?;
//! out.write_all(b"progress")?;
//! out.commit()?; // Nothing replaces the old save before this point
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! Overlay stacks can also be described in TOML, see [`config`].

pub mod config;
pub mod core;

pub use crate::config::{LayerConfig, LayerKind, OverlayConfig};
pub use crate::core::{
    util, ArchiveFileSystem, ArchiveRecord, ArchiveSource, CollectQuery, CompressionMethod,
    FilePath, FileSystem, FileSystemView, InMemoryFileSystem, InputStream, MultiFileSystem,
    MultiFileSystemBuilder, OutputStream, RegularFileSystem, Result, SecureFileWriter,
    SecureOutputStream, VfsError, WritableFileSystem, ZipSource,
};
