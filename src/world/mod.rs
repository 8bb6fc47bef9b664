pub mod avatar;
pub mod composition;

// Re-export the request-facing types
pub use avatar::{
    Attributes, AvatarDescriptor, BodyColors, BodyPart, HexColor, ItemId, ItemSlot,
    DEFAULT_BODY_COLOR, EMPTY_SLOT, HAT_SLOTS,
};
pub use composition::{preview_descriptor, CompositionMode, JobError, PreviewSlot, RenderJob, RenderType};
