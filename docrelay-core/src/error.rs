//! Error types and result alias for database operations.
//!
//! Failures surface to callers as a failed future or as an `Err` item that
//! terminates a result stream. Decorating adapters may translate an error's
//! kind but must always surface failure; there is no retry inside this layer.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// All errors an operation dispatched through an adapter chain can produce.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The operation targeted a document that must exist but does not.
    /// Arguments are the document, partition, and collection ids.
    #[error("document {0} not found in partition {1} of collection {2}")]
    DocumentNotFound(String, String, String),
    /// The data violates the collection's schema.
    #[error("schema validation failed: {0}")]
    SchemaValidation(String),
    /// An adapter cannot satisfy the requested operation or `Reach` level.
    #[error("capability error: {0}")]
    Capability(String),
    /// Opaque failure surfaced from the terminal backend, with diagnostic
    /// context supplied by the adapter that produced it.
    #[error("backend error: {0}")]
    Backend(String),
    /// Serialization/deserialization failure while converting field values.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// An identifier failed address validation (empty collection,
    /// partition, or document id).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

/// A specialized `Result` type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;

impl From<BsonError> for DatabaseError {
    fn from(err: BsonError) -> Self {
        DatabaseError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for DatabaseError {
    fn from(err: SerdeJsonError) -> Self {
        DatabaseError::Serialization(err.to_string())
    }
}
