//! Decorating adapters for docrelay.
//!
//! Each layer implements the full `DatabaseAdapter` capability surface,
//! owns exactly one inner adapter, and forwards every operation it does not
//! transform. Layers compose in caller-chosen order, outermost first:
//!
//! ```ignore
//! use docrelay_layers::{CacheLayer, SchemaLayer, SearchPromotionLayer};
//! use docrelay_memory::MemoryAdapter;
//!
//! let adapter = CacheLayer::new(
//!     SchemaLayer::new(
//!         SearchPromotionLayer::new(MemoryAdapter::new()),
//!         provider,
//!     ),
//! );
//! ```
//!
//! # Layers
//!
//! - [`CacheLayer`] - read-through document cache with write-through
//!   invalidation
//! - [`SchemaLayer`] - validates writes against collection schemas
//! - [`SearchPromotionLayer`] - routes full-text searches to a search
//!   engine, or degrades them to scans

#[allow(unused_extern_crates)]
extern crate self as docrelay_layers;

pub mod cache;
pub mod schema;
pub mod search;

pub use cache::CacheLayer;
pub use schema::SchemaLayer;
pub use search::SearchPromotionLayer;
