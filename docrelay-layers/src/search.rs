//! Search-engine promotion.
//!
//! [`SearchPromotionLayer`] is the compatibility seam that lets the same
//! client code run against a plain document store and a search-integrated
//! backend. A search whose filter uses the full-text
//! [`FieldOp::Matches`] operator is routed to the configured engine adapter
//! when the inner adapter lacks native full-text support; with no engine
//! configured, the full-text operators are degraded in place to a
//! scan-and-filter rewrite and the query goes to the inner adapter.
//!
//! The layer routes queries only; maintaining the external search index is
//! the engine operator's concern.

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use docrelay_core::{
    adapter::{Capabilities, DatabaseAdapter},
    address::DocumentPath,
    error::DatabaseResult,
    query::{Expr, FieldOp, Query},
    request::{
        DeleteRequest, InsertRequest, ReadRequest, SchemaReadRequest, SearchRequest,
        UpdateRequest, UpsertRequest,
    },
    snapshot::{QueryResultStream, SchemaMapStream, SnapshotStream},
};

/// Rewrites every `Matches` comparison into `Contains`, turning a full-text
/// query into one a scanning backend can satisfy.
fn demote_full_text(expr: Expr) -> Expr {
    match expr {
        Expr::And(list) => Expr::And(list.into_iter().map(demote_full_text).collect()),
        Expr::Or(list) => Expr::Or(list.into_iter().map(demote_full_text).collect()),
        Expr::Not(inner) => Expr::Not(Box::new(demote_full_text(*inner))),
        Expr::Exists(..) => expr,
        Expr::Field { field, op, value } => Expr::Field {
            field,
            op: match op {
                FieldOp::Matches => FieldOp::Contains,
                other => other,
            },
            value,
        },
    }
}

/// Decorating adapter that promotes full-text searches to a search engine.
#[derive(Debug)]
pub struct SearchPromotionLayer<A> {
    inner: A,
    engine: Option<Arc<dyn DatabaseAdapter>>,
}

impl<A: DatabaseAdapter> SearchPromotionLayer<A> {
    /// Wraps `inner` without an engine: full-text searches degrade to
    /// scan-and-filter.
    pub fn new(inner: A) -> Self {
        Self { inner, engine: None }
    }

    /// Wraps `inner` with a search-engine adapter that full-text searches
    /// are promoted to.
    pub fn with_engine(inner: A, engine: Arc<dyn DatabaseAdapter>) -> Self {
        Self { inner, engine: Some(engine) }
    }

    /// The wrapped inner adapter.
    pub fn inner(&self) -> &A {
        &self.inner
    }
}

#[async_trait]
impl<A: DatabaseAdapter> DatabaseAdapter for SearchPromotionLayer<A> {
    async fn perform_document_insert(
        &self,
        request: InsertRequest,
    ) -> DatabaseResult<DocumentPath> {
        self.inner.perform_document_insert(request).await
    }

    async fn perform_document_upsert(
        &self,
        request: UpsertRequest,
    ) -> DatabaseResult<DocumentPath> {
        self.inner.perform_document_upsert(request).await
    }

    async fn perform_document_update(&self, request: UpdateRequest) -> DatabaseResult<()> {
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
        let full_text = request
            .query
            .filter
            .as_ref()
            .is_some_and(|filter| filter.uses_op(&FieldOp::Matches));

        if !full_text || self.inner.capabilities().full_text_search {
            return self.inner.perform_document_search(request).await;
        }

        match &self.engine {
            Some(engine) => {
                debug!("promoting full-text search in {} to engine", request.partition);
                engine.perform_document_search(request).await
            }
            None => {
                debug!(
                    "no engine configured, degrading full-text search in {} to scan",
                    request.partition
                );
                let SearchRequest { partition, query, chunking, reach } = request;
                let Query { filter, sorter, skip, take } = query;

                let request = SearchRequest {
                    partition,
                    query: Query {
                        filter: filter.map(demote_full_text),
                        sorter,
                        skip,
                        take,
                    },
                    chunking,
                    reach,
                };

                self.inner.perform_document_search(request).await
            }
        }
    }

    async fn perform_schema_read(
        &self,
        request: SchemaReadRequest,
    ) -> DatabaseResult<SchemaMapStream> {
        self.inner.perform_schema_read(request).await
    }

    fn capabilities(&self) -> Capabilities {
        let mut capabilities = self.inner.capabilities();
        capabilities.full_text_search |= self.engine.is_some();

        capabilities
    }

    async fn shutdown(self) -> DatabaseResult<()> {
        self.inner.shutdown().await
    }
}
