//! The database adapter capability surface.
//!
//! A [`DatabaseAdapter`] implements one method per request kind. Adapters
//! compose by wrapping: a decorating adapter owns exactly one inner adapter
//! and, per operation, either forwards the request unchanged or transforms
//! the request/response around the forward. The innermost (terminal)
//! adapter is the only one that performs backend I/O. Composition order is
//! chosen by the caller at construction time, outermost first.
//!
//! # Contract
//!
//! - A terminal adapter implements every operation; an operation it cannot
//!   provide fails immediately with
//!   [`DatabaseError::Capability`](crate::error::DatabaseError::Capability) —
//!   no partial emulation.
//! - A decorating adapter never swallows an inner error and never
//!   substitutes a default result for a failure.
//! - Forwarding logic is reentrant: requests may be dispatched concurrently
//!   through the same chain.
//! - Suspension on backend I/O happens only inside terminal adapters.
//!
//! # Example
//!
//! ```ignore
//! use docrelay_core::adapter::DatabaseAdapter;
//!
//! // outermost first: cache -> schema enforcement -> terminal backend
//! let adapter = CacheLayer::new(SchemaLayer::new(MemoryAdapter::new(), provider));
//! let database = Database::new(adapter);
//! ```

use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

use crate::{
    address::DocumentPath,
    error::DatabaseResult,
    reach::Reach,
    request::{
        DeleteRequest, InsertRequest, ReadRequest, SchemaReadRequest, SearchRequest,
        UpdateRequest, UpsertRequest,
    },
    snapshot::{QueryResultStream, SchemaMapStream, SnapshotStream},
};

/// Static description of what an adapter (or a whole chain) can do.
///
/// Composition sites and decorating adapters interrogate this instead of
/// issuing probe requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// The highest [`Reach`] the adapter can guarantee. Requests demanding
    /// more must fail with a capability error.
    pub max_reach: Reach,
    /// Whether full-text search operators execute natively.
    pub full_text_search: bool,
    /// Whether read streams stay open and push live updates.
    pub live_reads: bool,
}

impl Capabilities {
    /// Capabilities of a plain local store: local reach only, no native
    /// full-text search, no live reads.
    pub fn local() -> Self {
        Self {
            max_reach: Reach::Local,
            full_text_search: false,
            live_reads: false,
        }
    }
}

/// Abstract interface the request-delegation protocol dispatches against.
///
/// Implementations must be thread-safe (`Send + Sync`) and tolerate
/// concurrent dispatches. All methods are async; the streams they return
/// are lazy, and dropping a stream cancels the work behind it.
#[async_trait]
pub trait DatabaseAdapter: Send + Sync + Debug {
    /// Creates a new document, returning its address.
    ///
    /// See [`InsertRequest`] for the id-assignment and failure contract.
    async fn perform_document_insert(
        &self,
        request: InsertRequest,
    ) -> DatabaseResult<DocumentPath>;

    /// Creates or replaces a document, returning its address. Idempotent.
    async fn perform_document_upsert(
        &self,
        request: UpsertRequest,
    ) -> DatabaseResult<DocumentPath>;

    /// Replaces an existing document; fails with `DocumentNotFound` when the
    /// document is absent.
    async fn perform_document_update(&self, request: UpdateRequest) -> DatabaseResult<()>;

    /// Deletes a document, honoring the adapter's documented policy for
    /// absent documents.
    async fn perform_document_delete(&self, request: DeleteRequest) -> DatabaseResult<()>;

    /// Reads a document as a lazy stream of at most one snapshot (more for
    /// live backends). An absent document produces an empty stream.
    async fn perform_document_read(&self, request: ReadRequest) -> DatabaseResult<SnapshotStream>;

    /// Searches a partition; see [`SearchRequest`] for the chunked emission
    /// contract.
    async fn perform_document_search(
        &self,
        request: SearchRequest,
    ) -> DatabaseResult<QueryResultStream>;

    /// Reads the schema map covering a collection.
    async fn perform_schema_read(
        &self,
        request: SchemaReadRequest,
    ) -> DatabaseResult<SchemaMapStream>;

    /// What this adapter (chain) can do.
    fn capabilities(&self) -> Capabilities;

    /// Cleanly shuts down the adapter, releasing backend resources.
    ///
    /// The default implementation is a no-op; terminal adapters holding
    /// connections should override it.
    async fn shutdown(self) -> DatabaseResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
impl<A> DatabaseAdapter for &A
where
    A: DatabaseAdapter + ?Sized,
{
    async fn perform_document_insert(
        &self,
        request: InsertRequest,
    ) -> DatabaseResult<DocumentPath> {
        (*self).perform_document_insert(request).await
    }

    async fn perform_document_upsert(
        &self,
        request: UpsertRequest,
    ) -> DatabaseResult<DocumentPath> {
        (*self).perform_document_upsert(request).await
    }

    async fn perform_document_update(&self, request: UpdateRequest) -> DatabaseResult<()> {
        (*self).perform_document_update(request).await
    }

    async fn perform_document_delete(&self, request: DeleteRequest) -> DatabaseResult<()> {
        (*self).perform_document_delete(request).await
    }

    async fn perform_document_read(&self, request: ReadRequest) -> DatabaseResult<SnapshotStream> {
        (*self).perform_document_read(request).await
    }

    async fn perform_document_search(
        &self,
        request: SearchRequest,
    ) -> DatabaseResult<QueryResultStream> {
        (*self).perform_document_search(request).await
    }

    async fn perform_schema_read(
        &self,
        request: SchemaReadRequest,
    ) -> DatabaseResult<SchemaMapStream> {
        (*self).perform_schema_read(request).await
    }

    fn capabilities(&self) -> Capabilities {
        (**self).capabilities()
    }
}

#[async_trait]
impl<A> DatabaseAdapter for Arc<A>
where
    A: DatabaseAdapter + ?Sized,
{
    async fn perform_document_insert(
        &self,
        request: InsertRequest,
    ) -> DatabaseResult<DocumentPath> {
        self.as_ref().perform_document_insert(request).await
    }

    async fn perform_document_upsert(
        &self,
        request: UpsertRequest,
    ) -> DatabaseResult<DocumentPath> {
        self.as_ref().perform_document_upsert(request).await
    }

    async fn perform_document_update(&self, request: UpdateRequest) -> DatabaseResult<()> {
        self.as_ref().perform_document_update(request).await
    }

    async fn perform_document_delete(&self, request: DeleteRequest) -> DatabaseResult<()> {
        self.as_ref().perform_document_delete(request).await
    }

    async fn perform_document_read(&self, request: ReadRequest) -> DatabaseResult<SnapshotStream> {
        self.as_ref().perform_document_read(request).await
    }

    async fn perform_document_search(
        &self,
        request: SearchRequest,
    ) -> DatabaseResult<QueryResultStream> {
        self.as_ref().perform_document_search(request).await
    }

    async fn perform_schema_read(
        &self,
        request: SchemaReadRequest,
    ) -> DatabaseResult<SchemaMapStream> {
        self.as_ref().perform_schema_read(request).await
    }

    fn capabilities(&self) -> Capabilities {
        self.as_ref().capabilities()
    }
}

/// Factory trait for constructing adapter instances.
#[async_trait]
pub trait AdapterBuilder {
    type Adapter: DatabaseAdapter;

    async fn build(self) -> DatabaseResult<Self::Adapter>;
}
