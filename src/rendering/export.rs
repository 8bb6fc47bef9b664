//! Scene export and thumbnail output paths
//!
//! Rasterization happens outside this crate. [`SceneExporter`] is the hand-off
//! point: it receives the finished scene and a destination path and is
//! responsible for whatever ends up on disk there.

use super::scene::Scene;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Directory under the output root that holds every thumbnail.
pub const THUMBNAIL_DIR: &str = "thumbnails";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("invalid output name {name:?}")]
    InvalidName { name: String },

    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode scene: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("renderer failed: {reason}")]
    Renderer { reason: String },
}

/// External renderer boundary.
#[async_trait]
pub trait SceneExporter: Send + Sync {
    async fn export(&self, scene: &Scene, destination: &Path) -> Result<(), ExportError>;
}

/// Suffix of the scene document written next to a thumbnail destination.
pub const SCENE_DOCUMENT_SUFFIX: &str = ".scene.json";

/// `<destination>.scene.json`, e.g. `abc.png` becomes `abc.png.scene.json`.
pub fn scene_document_path(destination: &Path) -> PathBuf {
    let mut path = destination.as_os_str().to_owned();
    path.push(SCENE_DOCUMENT_SUFFIX);
    PathBuf::from(path)
}

/// Writes the scene as a JSON sidecar for an out-of-process rasterizer,
/// which owns the image at `destination` itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct SceneDocumentExporter;

#[async_trait]
impl SceneExporter for SceneDocumentExporter {
    async fn export(&self, scene: &Scene, destination: &Path) -> Result<(), ExportError> {
        let document = serde_json::to_vec_pretty(scene)?;
        let path = scene_document_path(destination);
        tokio::fs::write(&path, &document)
            .await
            .map_err(|source| ExportError::Write {
                path: path.clone(),
                source,
            })?;
        debug!("Wrote scene document ({} bytes) to {}", document.len(), path.display());
        Ok(())
    }
}

/// Thumbnail directory tree rooted at the configured output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTree {
    root: PathBuf,
}

impl OutputTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/thumbnails/<name>`. The name may contain subdirectories but
    /// must stay inside the thumbnail directory.
    pub fn thumbnail_path(&self, name: &str) -> Result<PathBuf, ExportError> {
        let relative = Path::new(name);
        let escapes = name.is_empty()
            || relative
                .components()
                .any(|component| !matches!(component, Component::Normal(_)));
        if escapes {
            return Err(ExportError::InvalidName { name: name.to_string() });
        }

        Ok(self.root.join(THUMBNAIL_DIR).join(relative))
    }

    /// Resolve the destination for `name` and create its parent directories.
    /// Concurrent renders to the same name race; the last write wins.
    pub async fn prepare(&self, name: &str) -> Result<PathBuf, ExportError> {
        let destination = self.thumbnail_path(name)?;
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ExportError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        Ok(destination)
    }
}
