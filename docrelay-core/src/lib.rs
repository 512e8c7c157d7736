//! A layered, backend-agnostic document database abstraction.
//!
//! This crate is the core of the docrelay project and provides:
//!
//! - **Addressing model** ([`address`]) - Collections, partitions, and document paths
//! - **Adapter abstraction** ([`adapter`]) - The capability surface adapters implement and compose over
//! - **Request protocol** ([`request`]) - One typed request per operation, dispatched via delegation
//! - **Query model** ([`query`]) - Backend-agnostic filters, sorters, and windowing
//! - **Database facade** ([`database`]) - Collection/partition/document handles that construct requests
//! - **Snapshots and results** ([`snapshot`]) - Materialized reads and result streams
//! - **Schemas** ([`schema`]) - Collection schemas and the schema lookup interface
//! - **Consistency levels** ([`reach`]) - The ordered reach requirement carried by every request
//! - **Error handling** ([`error`]) - Error taxonomy and result type
//!
//! # Example
//!
//! ```ignore
//! use docrelay_core::{database::Database, query::{Query, Filter}};
//! use bson::doc;
//!
//! let database = Database::new(adapter);
//! let partition = database.collection("users")?.partition("eu")?;
//!
//! let doc = partition.insert(doc! { "name": "Alice", "age": 30 }).await?;
//!
//! let result = partition
//!     .search(Query::builder().filter(Filter::gt("age", 18)).build())
//!     .await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as docrelay_core;

pub mod adapter;
pub mod address;
pub mod database;
pub mod error;
pub mod query;
pub mod reach;
pub mod request;
pub mod schema;
pub mod snapshot;
