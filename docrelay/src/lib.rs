//! Main docrelay crate: one client-facing document database API mapped onto
//! heterogeneous storage backends through a chain of adapters.
//!
//! This crate is the primary entry point for users of the docrelay
//! framework. It re-exports the core model, the decorating layers, and the
//! in-memory terminal backend.
//!
//! # Features
//!
//! - **One API, many backends** - collections, partitions, documents, and
//!   queries over any `DatabaseAdapter` implementation
//! - **Adapter composition** - wrap a terminal backend with caching, schema
//!   enforcement, and search promotion in any order
//! - **Typed requests** - every operation is an immutable request value
//!   delegated through the chain
//! - **Streaming results** - reads and searches produce lazy streams with a
//!   cancellation contract
//!
//! # Quick start
//!
//! ```ignore
//! use docrelay::{prelude::*, memory::MemoryAdapter};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let database = Database::new(MemoryAdapter::new());
//!     let partition = database.collection("users")?.partition("eu")?;
//!
//!     // Insert a document, letting the backend assign the id
//!     let doc = partition.insert(doc! { "name": "Alice", "age": 30 }).await?;
//!
//!     // Read it back
//!     let snapshot = doc.get().await?.expect("document exists");
//!     assert_eq!(snapshot.get("name"), Some(&bson::Bson::String("Alice".into())));
//!
//!     // Search the partition
//!     let result = partition
//!         .search(
//!             Query::builder()
//!                 .filter(Filter::gt("age", 18))
//!                 .sorter(Sorter::by("age"))
//!                 .build(),
//!         )
//!         .await?;
//!     assert_eq!(result.len(), 1);
//!
//!     database.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Composing an adapter chain
//!
//! Decorating adapters wrap an inner adapter and forward what they do not
//! transform. Order is chosen at construction time, outermost first:
//!
//! ```ignore
//! use docrelay::{prelude::*, layers::{CacheLayer, SchemaLayer}, memory::MemoryAdapter};
//! use std::sync::Arc;
//!
//! let provider = Arc::new(
//!     StaticSchemaProvider::new().with(
//!         CollectionId::new("users")?,
//!         Schema::builder().required("name", FieldKind::String).build(),
//!     ),
//! );
//!
//! // cache -> schema enforcement -> terminal backend
//! let database = Database::new(CacheLayer::new(SchemaLayer::new(
//!     MemoryAdapter::new(),
//!     provider,
//! )));
//! ```

pub mod prelude;

pub use docrelay_core::{adapter, address, database, error, query, reach, request, schema, snapshot};

// Re-export BSON types for convenience
pub use bson;

/// Decorating adapter implementations.
pub mod layers {
    pub use docrelay_layers::{CacheLayer, SchemaLayer, SearchPromotionLayer};
}

/// In-memory terminal adapter implementations.
pub mod memory {
    pub use docrelay_memory::{DeletePolicy, MemoryAdapter, MemoryAdapterBuilder};
}
