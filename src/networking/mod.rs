//! Network-facing pieces of the renderer
//!
//! `assets` talks outward to the poly metadata API; `server` accepts the
//! render requests.

pub mod assets;
pub mod server;

pub use assets::{AssetError, AssetResolver, HttpPolyClient, PolyLookup};
pub use server::{RenderServer, ServiceError};
