//! Asset resolution type definitions
//!
//! Shared types used by the metadata client, the resolver and the scene
//! assembler.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// URI scheme the metadata service prefixes onto asset ids.
pub const ASSET_SCHEME: &str = "asset://";

/// Strip the [`ASSET_SCHEME`] prefix from an asset id, if present.
pub fn strip_scheme(raw: &str) -> &str {
    raw.strip_prefix(ASSET_SCHEME).unwrap_or(raw)
}

/// One record returned by the poly metadata lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PolyRecord {
    #[serde(default)]
    pub mesh: String,
    #[serde(default)]
    pub texture: String,
}

impl PolyRecord {
    pub fn mesh_id(&self) -> &str {
        strip_scheme(&self.mesh)
    }

    pub fn texture_id(&self) -> &str {
        strip_scheme(&self.texture)
    }
}

/// URL of a mesh the exporter will load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MeshRef(String);

impl MeshRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn url(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MeshRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// URL of a texture the exporter will load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TextureRef(String);

impl TextureRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn url(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TextureRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mesh plus optional texture for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub mesh: MeshRef,
    pub texture: Option<TextureRef>,
}

/// Failure of a single metadata lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("lookup request failed: {reason}")]
    Transport { reason: String },

    #[error("lookup timed out")]
    Timeout,

    #[error("lookup returned HTTP {status}")]
    Status { status: u16 },

    #[error("lookup body could not be decoded: {reason}")]
    Decode { reason: String },
}

impl From<reqwest::Error> for AssetError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AssetError::Timeout
        } else if err.is_decode() {
            AssetError::Decode { reason: err.to_string() }
        } else {
            AssetError::Transport { reason: err.to_string() }
        }
    }
}

/// Why a slot contributes nothing to the scene.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Unavailable {
    #[error("slot is empty")]
    EmptySlot,

    #[error(transparent)]
    Lookup(#[from] AssetError),

    #[error("no records returned")]
    NoRecords,

    #[error("mesh id is empty")]
    MissingMesh,

    #[error("texture id is empty")]
    MissingTexture,
}

/// Outcome of resolving one slot.
///
/// An unavailable slot is dropped from the scene; it never fails the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    Resolved(T),
    Unavailable(Unavailable),
}

impl<T> Resolution<T> {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    pub fn resolved(self) -> Option<T> {
        match self {
            Resolution::Resolved(value) => Some(value),
            Resolution::Unavailable(_) => None,
        }
    }
}

impl<T> From<Result<T, Unavailable>> for Resolution<T> {
    fn from(outcome: Result<T, Unavailable>) -> Self {
        match outcome {
            Ok(value) => Resolution::Resolved(value),
            Err(reason) => Resolution::Unavailable(reason),
        }
    }
}

/// Base URLs of the metadata API and the static CDN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEndpoints {
    api_url: String,
    cdn_url: String,
}

impl AssetEndpoints {
    pub fn new(api_url: impl Into<String>, cdn_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            cdn_url: cdn_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Metadata lookup for one item.
    pub fn poly_url(&self, item_id: &str) -> String {
        format!("{}/v1/assets/getPoly/1/{}", self.api_url, item_id)
    }

    /// Download URL for a stripped asset id.
    pub fn asset_url(&self, asset_id: &str) -> String {
        format!("{}/v1/assets/get/{}", self.api_url, asset_id)
    }

    /// Fixed file on the static CDN.
    pub fn cdn_asset(&self, file_name: &str) -> String {
        format!("{}/assets/{}", self.cdn_url, file_name)
    }

    pub fn default_face(&self) -> TextureRef {
        TextureRef::new(self.cdn_asset("DefaultFace.png"))
    }
}
