//! Item identifier → mesh/texture resolution
//!
//! Every lookup degrades instead of failing: an empty slot, a network error, a
//! bad payload or a missing mesh all become [`Resolution::Unavailable`] and
//! the slot simply contributes nothing to the scene.

use super::client::PolyLookup;
use super::types::{AssetEndpoints, MeshRef, PolyRecord, Resolution, ResolvedAsset, TextureRef, Unavailable};
use crate::world::ItemId;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct AssetResolver {
    lookup: Arc<dyn PolyLookup>,
    endpoints: AssetEndpoints,
}

impl std::fmt::Debug for AssetResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetResolver")
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl AssetResolver {
    pub fn new(lookup: Arc<dyn PolyLookup>, endpoints: AssetEndpoints) -> Self {
        Self { lookup, endpoints }
    }

    pub fn endpoints(&self) -> &AssetEndpoints {
        &self.endpoints
    }

    /// First metadata record for `item`. Empty slots never reach the network.
    async fn first_record(&self, item: &ItemId) -> Result<PolyRecord, Unavailable> {
        if item.is_empty_slot() {
            return Err(Unavailable::EmptySlot);
        }

        let records = self.lookup.fetch_poly(item.as_str()).await?;
        records.into_iter().next().ok_or(Unavailable::NoRecords)
    }

    /// Resolve an item that brings its own mesh (hats, tools).
    pub async fn resolve(&self, item: &ItemId) -> Resolution<ResolvedAsset> {
        let outcome = match self.first_record(item).await {
            Ok(record) => self.full_asset(&record),
            Err(reason) => Err(reason),
        };
        settle(item, "item", outcome)
    }

    /// Resolve an item that only textures an existing body mesh (shirts,
    /// pants, t-shirts, faces). The record's mesh is ignored.
    pub async fn resolve_texture(&self, item: &ItemId) -> Resolution<TextureRef> {
        let outcome = match self.first_record(item).await {
            Ok(record) => self.texture_of(&record).ok_or(Unavailable::MissingTexture),
            Err(reason) => Err(reason),
        };
        settle(item, "texture", outcome)
    }

    /// Face texture for the head, falling back to the CDN default face when
    /// the slot is empty or the face cannot be resolved.
    pub async fn resolve_face(&self, face: &ItemId) -> TextureRef {
        match self.resolve_texture(face).await {
            Resolution::Resolved(texture) => texture,
            Resolution::Unavailable(reason) => {
                let fallback = self.endpoints.default_face();
                info!("Face {}: {}, using default face texture {}", face, reason, fallback);
                fallback
            }
        }
    }

    fn full_asset(&self, record: &PolyRecord) -> Result<ResolvedAsset, Unavailable> {
        let mesh_id = record.mesh_id();
        if mesh_id.is_empty() {
            return Err(Unavailable::MissingMesh);
        }

        Ok(ResolvedAsset {
            mesh: MeshRef::new(self.endpoints.asset_url(mesh_id)),
            texture: self.texture_of(record),
        })
    }

    fn texture_of(&self, record: &PolyRecord) -> Option<TextureRef> {
        let texture_id = record.texture_id();
        if texture_id.is_empty() {
            None
        } else {
            Some(TextureRef::new(self.endpoints.asset_url(texture_id)))
        }
    }
}

/// Log the outcome of one slot and wrap it.
fn settle<T>(item: &ItemId, kind: &str, outcome: Result<T, Unavailable>) -> Resolution<T> {
    match &outcome {
        Ok(_) => debug!("Resolved {} {}", kind, item),
        Err(Unavailable::EmptySlot) => {}
        Err(reason) => warn!("Could not resolve {} {}: {}", kind, item, reason),
    }
    outcome.into()
}
