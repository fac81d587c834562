//! TOML description of an overlay stack
//!
//! ```toml
//! [[layer]]
//! kind = "archive"
//! path = "data/base.zip"
//!
//! [[layer]]
//! kind = "regular"
//! path = "saves"
//! base = "profile1"
//! ```
//!
//! Layers are consulted in the order they are listed. Relative paths in a
//! file loaded with [`OverlayConfig::load`] are relative to that file's folder.

use crate::core::archive::ArchiveFileSystem;
use crate::core::error::{Result, VfsError};
use crate::core::filesystem::FileSystem;
use crate::core::memory::InMemoryFileSystem;
use crate::core::multi::MultiFileSystem;
use crate::core::path::FilePath;
use crate::core::regular::RegularFileSystem;
use crate::core::view::FileSystemView;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Storage type of a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// OS folder, requires `path`
    Regular,
    /// Empty in-memory storage
    Memory,
    /// ZIP file, requires `path`, always read-only
    Archive,
}

/// One member of the overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub kind: LayerKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(default)]
    pub read_only: bool,

    /// Restricts the layer to this folder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<FilePath>,
}

impl LayerConfig {
    pub fn new(kind: LayerKind) -> Self {
        LayerConfig {
            kind,
            path: None,
            read_only: false,
            base: None,
        }
    }

    pub fn path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn base(mut self, base: FilePath) -> Self {
        self.base = Some(base);
        self
    }

    fn require_path(&self) -> Result<&Path> {
        self.path.as_deref().ok_or_else(|| {
            VfsError::Config(format!("{:?} layer requires a path", self.kind))
        })
    }

    /// Open the file system described by this layer.
    pub fn open(&self) -> Result<Arc<dyn FileSystem>> {
        let fs: Arc<dyn FileSystem> = match self.kind {
            LayerKind::Regular => {
                let root = self.require_path()?;
                if self.read_only {
                    Arc::new(RegularFileSystem::read_only(root))
                } else {
                    Arc::new(RegularFileSystem::new(root))
                }
            }
            LayerKind::Memory => Arc::new(InMemoryFileSystem::new(self.read_only)),
            LayerKind::Archive => Arc::new(ArchiveFileSystem::open(self.require_path()?)?),
        };

        match &self.base {
            Some(base) => Ok(Arc::new(FileSystemView::new(fs, base.clone()))),
            None => Ok(fs),
        }
    }
}

/// Ordered list of layers forming a [`MultiFileSystem`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    #[serde(default)]
    pub layer: Vec<LayerConfig>,
}

impl OverlayConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Parse a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading overlay configuration from {:?}", path);

        let content = fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;

        if let Some(folder) = path.parent() {
            for layer in &mut config.layer {
                if let Some(layer_path) = layer.path.as_mut() {
                    if layer_path.is_relative() {
                        *layer_path = folder.join(&*layer_path);
                    }
                }
            }
        }
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| VfsError::Config(e.to_string()))
    }

    /// Open every layer, in order, and combine them.
    ///
    /// Layers opened before a failing one are closed again.
    pub fn build(&self) -> Result<MultiFileSystem> {
        let mut members = Vec::with_capacity(self.layer.len());
        for (index, layer) in self.layer.iter().enumerate() {
            match layer.open() {
                Ok(fs) => {
                    debug!("Opened layer {} ({:?})", index, layer.kind);
                    members.push(fs);
                }
                Err(e) => {
                    for fs in &members {
                        fs.close();
                    }
                    return Err(e);
                }
            }
        }
        Ok(MultiFileSystem::new(members))
    }
}
