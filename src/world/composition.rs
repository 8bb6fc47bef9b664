//! Composition modes
//!
//! Both render types end in the same [`AvatarDescriptor`]; they differ only in
//! where the descriptor comes from. A full avatar render takes every attribute
//! from the request, an item preview starts from the bare baseline and puts a
//! single item into the slot named by its item type.

use super::avatar::{Attributes, AvatarDescriptor, ItemId, ItemSlot, EMPTY_SLOT};
use thiserror::Error;

/// Placeholder hash some callers send before a real one exists.
const PLACEHOLDER_HASH: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    #[error("Avatar Hash is required for renderUser")]
    MissingAvatarHash,

    #[error("Item hash and ID are required for preview")]
    MissingPreviewTarget,

    #[error("Item type is required for preview")]
    MissingItemType,
}

/// Render type selector sent as `RenderType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderType {
    User,
    Item,
}

impl RenderType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(RenderType::User),
            "item" => Some(RenderType::Item),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RenderType::User => "user",
            RenderType::Item => "item",
        }
    }
}

/// Item-type discriminator for previews.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewSlot {
    Face,
    Hat,
    Tool,
    Shirt,
    TShirt,
    Pants,
}

impl PreviewSlot {
    pub fn parse(item_type: &str) -> Option<Self> {
        match item_type {
            "face" => Some(PreviewSlot::Face),
            "hat" => Some(PreviewSlot::Hat),
            "tool" => Some(PreviewSlot::Tool),
            "shirt" => Some(PreviewSlot::Shirt),
            "tshirt" => Some(PreviewSlot::TShirt),
            "pants" => Some(PreviewSlot::Pants),
            _ => None,
        }
    }

    /// Hats always preview in the first hat slot.
    pub fn item_slot(&self) -> ItemSlot {
        match self {
            PreviewSlot::Face => ItemSlot::Face,
            PreviewSlot::Hat => ItemSlot::Hat(0),
            PreviewSlot::Tool => ItemSlot::Tool,
            PreviewSlot::Shirt => ItemSlot::Shirt,
            PreviewSlot::TShirt => ItemSlot::TShirt,
            PreviewSlot::Pants => ItemSlot::Pants,
        }
    }
}

/// Baseline avatar with `item` placed into the slot selected by `item_type`.
///
/// An unrecognised item type leaves the baseline untouched and renders a bare
/// default avatar.
pub fn preview_descriptor(item: &ItemId, item_type: &str) -> AvatarDescriptor {
    let mut avatar = AvatarDescriptor::default();
    match PreviewSlot::parse(item_type) {
        Some(slot) => *avatar.slot_mut(slot.item_slot()) = item.clone(),
        None => tracing::debug!("Unknown preview item type {:?}, rendering bare avatar", item_type),
    }
    avatar
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositionMode {
    FullAvatar(AvatarDescriptor),
    ItemPreview { item: ItemId, item_type: String },
}

impl CompositionMode {
    pub fn descriptor(&self) -> AvatarDescriptor {
        match self {
            CompositionMode::FullAvatar(avatar) => avatar.clone(),
            CompositionMode::ItemPreview { item, item_type } => preview_descriptor(item, item_type),
        }
    }

    pub fn render_type(&self) -> RenderType {
        match self {
            CompositionMode::FullAvatar(_) => RenderType::User,
            CompositionMode::ItemPreview { .. } => RenderType::Item,
        }
    }
}

/// One validated render: what to compose and where the thumbnail goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderJob {
    pub mode: CompositionMode,
    /// Opaque output name (relative path under the thumbnails directory).
    pub output: String,
}

impl RenderJob {
    pub fn from_attributes(render_type: RenderType, attributes: &Attributes) -> Result<Self, JobError> {
        match render_type {
            RenderType::User => Self::full_avatar(attributes),
            RenderType::Item => Self::item_preview(attributes),
        }
    }

    /// Full avatar render: `hash` names the output, everything else is
    /// optional and defaulted.
    pub fn full_avatar(attributes: &Attributes) -> Result<Self, JobError> {
        let hash = non_empty(attributes, "hash")
            .filter(|hash| *hash != PLACEHOLDER_HASH)
            .ok_or(JobError::MissingAvatarHash)?;

        Ok(Self {
            mode: CompositionMode::FullAvatar(AvatarDescriptor::from_attributes(attributes)),
            output: hash.to_string(),
        })
    }

    /// Single item preview: `item`, `itemhash` and `itemtype` are required.
    pub fn item_preview(attributes: &Attributes) -> Result<Self, JobError> {
        let item = non_empty(attributes, "item");
        let hash = non_empty(attributes, "itemhash").filter(|hash| *hash != EMPTY_SLOT);
        let (item, hash) = match (item, hash) {
            (Some(item), Some(hash)) => (item, hash),
            _ => return Err(JobError::MissingPreviewTarget),
        };
        let item_type = non_empty(attributes, "itemtype").ok_or(JobError::MissingItemType)?;

        Ok(Self {
            mode: CompositionMode::ItemPreview {
                item: ItemId::new(item),
                item_type: item_type.to_string(),
            },
            output: hash.to_string(),
        })
    }
}

fn non_empty<'a>(attributes: &'a Attributes, key: &str) -> Option<&'a str> {
    attributes
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}
