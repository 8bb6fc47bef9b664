// Avatar thumbnail renderer
// Resolves equipped items, composes the scene, hands it to the exporter

pub mod app;
pub mod config;
pub mod networking;
pub mod rendering;
pub mod utils;
pub mod world;

// Re-export commonly used types for convenience
pub use crate::app::{RenderApp, RenderReport};
pub use crate::config::ServerSettings;
pub use crate::networking::server::RenderServer;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
