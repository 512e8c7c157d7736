//! In-memory terminal adapter for docrelay.
//!
//! This crate provides a thread-safe, in-memory implementation of the
//! `DatabaseAdapter` capability surface. It is the reference terminal
//! backend: ideal for tests, development, and small deployments, and the
//! innermost adapter most chains in this workspace are composed over.
//!
//! # Features
//!
//! - **Thread-safe access** - concurrent reads and writes behind an
//!   async-aware read-write lock; clones share state
//! - **Full query support** - filtering, composite sorting, and skip/take
//!   windowing by scanning the addressed partition
//! - **Incremental search** - chunked searches emit monotonically growing
//!   results
//! - **Configurable delete policy** - idempotent or strict handling of
//!   absent documents
//!
//! # Quick start
//!
//! ```ignore
//! use docrelay_core::database::Database;
//! use docrelay_memory::MemoryAdapter;
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let database = Database::new(MemoryAdapter::new());
//!     let partition = database.collection("users")?.partition("eu")?;
//!
//!     let doc = partition.insert(doc! { "name": "Alice" }).await?;
//!     assert!(doc.get().await?.is_some());
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docrelay_memory;

pub mod adapter;
pub mod evaluator;

pub use adapter::{DeletePolicy, MemoryAdapter, MemoryAdapterBuilder};
