//! Remote asset resolution
//!
//! Turns item identifiers into mesh and texture URLs by asking the poly
//! metadata service, and builds the URLs of the fixed body assets served from
//! the CDN.

pub mod client;
pub mod resolver;
pub mod types;

pub use client::{parse_poly_records, HttpPolyClient, PolyLookup};
pub use resolver::AssetResolver;
pub use types::*;
