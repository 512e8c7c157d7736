//! Typed request values and the delegation protocol.
//!
//! Every client-facing operation constructs exactly one request value and
//! hands it to `delegate_to`, which invokes the single
//! [`DatabaseAdapter`](crate::adapter::DatabaseAdapter) method that request
//! kind maps to. The indirection lets a decorating adapter intercept the
//! operations it cares about and forward the rest untouched, without
//! knowing every request kind.
//!
//! Requests are immutable, single-use value objects: they carry every
//! parameter needed for one adapter invocation and no retry state. A retry,
//! if a caller wants one, constructs a new request.

use std::fmt;
use std::num::NonZeroUsize;

use crate::{
    adapter::DatabaseAdapter,
    address::{CollectionId, DocumentId, DocumentPath, PartitionPath},
    error::DatabaseResult,
    query::Query,
    reach::Reach,
    snapshot::{QueryResultStream, SchemaMapStream, SnapshotStream},
};

/// The request kinds, one per adapter method. Used in capability errors and
/// log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Insert,
    Upsert,
    Update,
    Delete,
    Read,
    Search,
    SchemaRead,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Insert => write!(f, "insert"),
            Operation::Upsert => write!(f, "upsert"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
            Operation::Read => write!(f, "read"),
            Operation::Search => write!(f, "search"),
            Operation::SchemaRead => write!(f, "schema read"),
        }
    }
}

/// Creates a new document.
///
/// With `document` absent the backend assigns the id; the created address is
/// the return value of delegation. Fails with
/// [`DatabaseError::Backend`](crate::error::DatabaseError::Backend) if the
/// backend rejects the write (duplicate id, backend-side validation).
#[derive(Debug)]
pub struct InsertRequest {
    pub partition: PartitionPath,
    pub document: Option<DocumentId>,
    pub data: bson::Document,
    pub reach: Reach,
}

impl InsertRequest {
    pub async fn delegate_to<A>(self, adapter: &A) -> DatabaseResult<DocumentPath>
    where
        A: DatabaseAdapter + ?Sized,
    {
        adapter.perform_document_insert(self).await
    }
}

/// Creates or replaces a document.
///
/// Idempotent by contract: applying the same `(document, data)` upsert twice
/// yields the same stored state as applying it once. With `document` absent
/// the adapter generates an id.
#[derive(Debug)]
pub struct UpsertRequest {
    pub partition: PartitionPath,
    pub document: Option<DocumentId>,
    pub data: bson::Document,
    pub reach: Reach,
}

impl UpsertRequest {
    pub async fn delegate_to<A>(self, adapter: &A) -> DatabaseResult<DocumentPath>
    where
        A: DatabaseAdapter + ?Sized,
    {
        adapter.perform_document_upsert(self).await
    }
}

/// Replaces an existing document.
///
/// Fails with [`DatabaseError::DocumentNotFound`](crate::error::DatabaseError::DocumentNotFound)
/// if the document does not exist; adapters must not silently upsert.
#[derive(Debug)]
pub struct UpdateRequest {
    pub document: DocumentPath,
    pub data: bson::Document,
    pub reach: Reach,
}

impl UpdateRequest {
    pub async fn delegate_to<A>(self, adapter: &A) -> DatabaseResult<()>
    where
        A: DatabaseAdapter + ?Sized,
    {
        adapter.perform_document_update(self).await
    }
}

/// Deletes a document.
///
/// Behavior for an absent document is the adapter's documented delete
/// policy: an idempotent no-op or `DocumentNotFound`, never anything else.
#[derive(Debug)]
pub struct DeleteRequest {
    pub document: DocumentPath,
    pub reach: Reach,
}

impl DeleteRequest {
    pub async fn delegate_to<A>(self, adapter: &A) -> DatabaseResult<()>
    where
        A: DatabaseAdapter + ?Sized,
    {
        adapter.perform_document_delete(self).await
    }
}

/// Reads a document as a lazy snapshot stream.
///
/// Non-live backends yield at most one snapshot and terminate; an absent
/// document yields an empty stream. Live backends keep the stream open.
#[derive(Debug)]
pub struct ReadRequest {
    pub document: DocumentPath,
    pub reach: Reach,
}

impl ReadRequest {
    pub async fn delegate_to<A>(self, adapter: &A) -> DatabaseResult<SnapshotStream>
    where
        A: DatabaseAdapter + ?Sized,
    {
        adapter.perform_document_read(self).await
    }
}

/// Searches a partition.
///
/// Without `chunking` the stream yields exactly one terminal
/// [`QueryResult`](crate::snapshot::QueryResult). With `chunking` the stream
/// yields results with monotonically growing snapshot sets; the last emitted
/// result is always complete per the query's `take`.
#[derive(Debug)]
pub struct SearchRequest {
    pub partition: PartitionPath,
    pub query: Query,
    pub chunking: Option<NonZeroUsize>,
    pub reach: Reach,
}

impl SearchRequest {
    pub async fn delegate_to<A>(self, adapter: &A) -> DatabaseResult<QueryResultStream>
    where
        A: DatabaseAdapter + ?Sized,
    {
        adapter.perform_document_search(self).await
    }
}

/// Reads the schema map covering a collection.
///
/// Unmanaged collections are absent from the produced map.
#[derive(Debug)]
pub struct SchemaReadRequest {
    pub collection: CollectionId,
    pub reach: Reach,
}

impl SchemaReadRequest {
    pub async fn delegate_to<A>(self, adapter: &A) -> DatabaseResult<SchemaMapStream>
    where
        A: DatabaseAdapter + ?Sized,
    {
        adapter.perform_schema_read(self).await
    }
}
