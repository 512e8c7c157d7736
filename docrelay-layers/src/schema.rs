//! Schema enforcement.
//!
//! [`SchemaLayer`] validates write data against the collection's schema
//! before forwarding. Collections without a schema are unmanaged and pass
//! through untouched. Deletes and reads are never failed on schema grounds.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use log::trace;

use docrelay_core::{
    adapter::{Capabilities, DatabaseAdapter},
    address::{CollectionId, DocumentPath},
    error::{DatabaseError, DatabaseResult},
    request::{
        DeleteRequest, InsertRequest, ReadRequest, SchemaReadRequest, SearchRequest,
        UpdateRequest, UpsertRequest,
    },
    schema::SchemaProvider,
    snapshot::{QueryResultStream, SchemaMapStream, SnapshotStream},
};

/// Decorating adapter that enforces collection schemas on writes.
///
/// Schema reads are answered by merging the inner adapter's map with the
/// provider's entries; the provider is authoritative for collections it
/// manages.
#[derive(Debug)]
pub struct SchemaLayer<A> {
    inner: A,
    provider: Arc<dyn SchemaProvider>,
}

impl<A: DatabaseAdapter> SchemaLayer<A> {
    pub fn new(inner: A, provider: Arc<dyn SchemaProvider>) -> Self {
        Self { inner, provider }
    }

    /// The wrapped inner adapter.
    pub fn inner(&self) -> &A {
        &self.inner
    }

    fn check(&self, collection: &CollectionId, data: &bson::Document) -> DatabaseResult<()> {
        let Some(schema) = self.provider.schema(collection) else {
            trace!("collection {collection} is unmanaged, skipping validation");
            return Ok(());
        };

        schema.validate(data).map_err(|violations| {
            DatabaseError::SchemaValidation(
                violations
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })
    }
}

#[async_trait]
impl<A: DatabaseAdapter> DatabaseAdapter for SchemaLayer<A> {
    async fn perform_document_insert(
        &self,
        request: InsertRequest,
    ) -> DatabaseResult<DocumentPath> {
        self.check(&request.partition.collection, &request.data)?;
        self.inner.perform_document_insert(request).await
    }

    async fn perform_document_upsert(
        &self,
        request: UpsertRequest,
    ) -> DatabaseResult<DocumentPath> {
        self.check(&request.partition.collection, &request.data)?;
        self.inner.perform_document_upsert(request).await
    }

    async fn perform_document_update(&self, request: UpdateRequest) -> DatabaseResult<()> {
        self.check(request.document.collection_id(), &request.data)?;
        self.inner.perform_document_update(request).await
    }

    async fn perform_document_delete(&self, request: DeleteRequest) -> DatabaseResult<()> {
        self.inner.perform_document_delete(request).await
    }

    async fn perform_document_read(&self, request: ReadRequest) -> DatabaseResult<SnapshotStream> {
        self.inner.perform_document_read(request).await
    }

    async fn perform_document_search(
        &self,
        request: SearchRequest,
    ) -> DatabaseResult<QueryResultStream> {
        self.inner.perform_document_search(request).await
    }

    async fn perform_schema_read(
        &self,
        request: SchemaReadRequest,
    ) -> DatabaseResult<SchemaMapStream> {
        let collection = request.collection.clone();
        let provider = Arc::clone(&self.provider);
        let inner_stream = self.inner.perform_schema_read(request).await?;

        Ok(inner_stream
            .map(move |item| {
                item.map(|mut map| {
                    if let Some(schema) = provider.schema(&collection) {
                        map.insert(collection.clone(), schema);
                    }

                    map
                })
            })
            .boxed())
    }

    fn capabilities(&self) -> Capabilities {
        self.inner.capabilities()
    }

    async fn shutdown(self) -> DatabaseResult<()> {
        self.inner.shutdown().await
    }
}
