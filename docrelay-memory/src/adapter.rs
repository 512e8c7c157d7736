//! In-memory terminal adapter.
//!
//! Documents live in nested hash maps behind an async-aware read-write
//! lock. The adapter is the reference terminal backend: it implements the
//! full capability surface with local reach, evaluating queries by scanning
//! a partition.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use futures::{StreamExt, stream};
use log::debug;
use mea::rwlock::RwLock;

use docrelay_core::{
    adapter::{AdapterBuilder, Capabilities, DatabaseAdapter},
    address::{CollectionId, DocumentId, DocumentPath, PartitionId},
    error::{DatabaseError, DatabaseResult},
    reach::Reach,
    request::{
        DeleteRequest, InsertRequest, Operation, ReadRequest, SchemaReadRequest, SearchRequest,
        UpdateRequest, UpsertRequest,
    },
    schema::SchemaMap,
    snapshot::{QueryResult, QueryResultStream, SchemaMapStream, Snapshot, SnapshotStream},
};

use crate::evaluator::{DocumentEvaluator, compare_documents};

type PartitionMap = HashMap<DocumentId, bson::Document>;
type CollectionMap = HashMap<PartitionId, PartitionMap>;
type StoreMap = HashMap<CollectionId, CollectionMap>;

/// What a delete of an absent document does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletePolicy {
    /// Deleting an absent document succeeds as an idempotent no-op.
    #[default]
    Ignore,
    /// Deleting an absent document fails with `DocumentNotFound`.
    Strict,
}

/// Thread-safe in-memory terminal adapter.
///
/// `MemoryAdapter` is cloneable; clones share the same underlying store.
/// Searches scan the addressed partition (no indexing), which is adequate
/// for tests and small datasets.
///
/// # Example
///
/// ```ignore
/// use docrelay_memory::MemoryAdapter;
/// use docrelay_core::database::Database;
/// use bson::doc;
///
/// let database = Database::new(MemoryAdapter::new());
/// let partition = database.collection("users")?.partition("eu")?;
/// partition.insert(doc! { "name": "Alice" }).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryAdapter {
    /// collection -> partition -> document id -> data
    store: Arc<RwLock<StoreMap>>,
    delete_policy: DeletePolicy,
}

impl MemoryAdapter {
    /// Creates an empty adapter with the default (idempotent) delete policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for constructing a `MemoryAdapter` with custom
    /// options.
    pub fn builder() -> MemoryAdapterBuilder {
        MemoryAdapterBuilder::default()
    }

    fn ensure_reach(&self, operation: Operation, reach: Reach) -> DatabaseResult<()> {
        if reach > Reach::Local {
            return Err(DatabaseError::Capability(format!(
                "memory adapter cannot guarantee {reach} reach for {operation}"
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl DatabaseAdapter for MemoryAdapter {
    async fn perform_document_insert(
        &self,
        request: InsertRequest,
    ) -> DatabaseResult<DocumentPath> {
        self.ensure_reach(Operation::Insert, request.reach)?;

        let id = request.document.unwrap_or_else(DocumentId::generate);
        let path = request.partition.document(id);

        let mut store = self.store.write().await;
        let partition = store
            .entry(path.partition.collection.clone())
            .or_default()
            .entry(path.partition.partition.clone())
            .or_default();

        if partition.contains_key(&path.document) {
            return Err(DatabaseError::Backend(format!(
                "document {path} already exists"
            )));
        }

        partition.insert(path.document.clone(), request.data);
        debug!("inserted {path}");

        Ok(path)
    }

    async fn perform_document_upsert(
        &self,
        request: UpsertRequest,
    ) -> DatabaseResult<DocumentPath> {
        self.ensure_reach(Operation::Upsert, request.reach)?;

        let id = request.document.unwrap_or_else(DocumentId::generate);
        let path = request.partition.document(id);

        let mut store = self.store.write().await;
        store
            .entry(path.partition.collection.clone())
            .or_default()
            .entry(path.partition.partition.clone())
            .or_default()
            .insert(path.document.clone(), request.data);
        debug!("upserted {path}");

        Ok(path)
    }

    async fn perform_document_update(&self, request: UpdateRequest) -> DatabaseResult<()> {
        self.ensure_reach(Operation::Update, request.reach)?;

        let path = request.document;
        let mut store = self.store.write().await;
        let document = store
            .get_mut(&path.partition.collection)
            .and_then(|collection| collection.get_mut(&path.partition.partition))
            .and_then(|partition| partition.get_mut(&path.document))
            .ok_or_else(|| path.not_found())?;

        *document = request.data;
        debug!("updated {path}");

        Ok(())
    }

    async fn perform_document_delete(&self, request: DeleteRequest) -> DatabaseResult<()> {
        self.ensure_reach(Operation::Delete, request.reach)?;

        let path = request.document;
        let mut store = self.store.write().await;
        let removed = store
            .get_mut(&path.partition.collection)
            .and_then(|collection| collection.get_mut(&path.partition.partition))
            .and_then(|partition| partition.remove(&path.document));

        match (removed, self.delete_policy) {
            (None, DeletePolicy::Strict) => Err(path.not_found()),
            _ => {
                debug!("deleted {path}");
                Ok(())
            }
        }
    }

    async fn perform_document_read(&self, request: ReadRequest) -> DatabaseResult<SnapshotStream> {
        self.ensure_reach(Operation::Read, request.reach)?;

        let path = request.document;
        let store = self.store.read().await;
        let snapshot = store
            .get(&path.partition.collection)
            .and_then(|collection| collection.get(&path.partition.partition))
            .and_then(|partition| partition.get(&path.document))
            .map(|data| Snapshot::existing(path.clone(), data.clone()));

        // At most one snapshot, none when absent; the store is not live.
        Ok(stream::iter(snapshot.map(Ok::<_, DatabaseError>)).boxed())
    }

    async fn perform_document_search(
        &self,
        request: SearchRequest,
    ) -> DatabaseResult<QueryResultStream> {
        self.ensure_reach(Operation::Search, request.reach)?;

        let query = request.query;

        let mut matches = {
            let store = self.store.read().await;
            let documents = store
                .get(&request.partition.collection)
                .and_then(|collection| collection.get(&request.partition.partition));

            let mut matches = Vec::new();
            if let Some(documents) = documents {
                for (id, data) in documents {
                    let selected = match &query.filter {
                        Some(filter) => DocumentEvaluator::new(data).evaluate(filter)?,
                        None => true,
                    };

                    if selected {
                        matches.push((id.clone(), data.clone()));
                    }
                }
            }

            matches
        };

        if let Some(sorter) = &query.sorter {
            matches.sort_by(|a, b| compare_documents(&a.1, &b.1, sorter));
        }

        let window = matches.into_iter().skip(query.skip);
        let complete = match query.take {
            Some(take) => window.take(take).collect::<Vec<_>>(),
            None => window.collect::<Vec<_>>(),
        };

        let snapshots = complete
            .into_iter()
            .map(|(id, data)| Snapshot::existing(request.partition.document(id), data))
            .collect::<Vec<_>>();

        debug!(
            "search in {} matched {} documents",
            request.partition,
            snapshots.len()
        );

        // One terminal emission, or monotonically growing prefixes whose
        // final element is the complete result.
        let mut sizes = Vec::new();
        if let Some(chunking) = request.chunking {
            let mut size = chunking.get();
            while size < snapshots.len() {
                sizes.push(size);
                size += chunking.get();
            }
        }
        sizes.push(snapshots.len());

        let results = sizes
            .into_iter()
            .map(|size| {
                Ok::<_, DatabaseError>(QueryResult {
                    partition: request.partition.clone(),
                    query: query.clone(),
                    snapshots: snapshots[..size].to_vec(),
                })
            })
            .collect::<Vec<_>>();

        Ok(stream::iter(results).boxed())
    }

    async fn perform_schema_read(
        &self,
        request: SchemaReadRequest,
    ) -> DatabaseResult<SchemaMapStream> {
        self.ensure_reach(Operation::SchemaRead, request.reach)?;

        // The store manages no schemas; every collection is unmanaged.
        Ok(stream::iter([Ok::<_, DatabaseError>(SchemaMap::new())]).boxed())
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::local()
    }
}

/// Builder for [`MemoryAdapter`] instances.
#[derive(Debug, Default)]
pub struct MemoryAdapterBuilder {
    delete_policy: DeletePolicy,
}

impl MemoryAdapterBuilder {
    /// Sets the policy applied when deleting an absent document.
    pub fn delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }
}

#[async_trait]
impl AdapterBuilder for MemoryAdapterBuilder {
    type Adapter = MemoryAdapter;

    async fn build(self) -> DatabaseResult<Self::Adapter> {
        Ok(MemoryAdapter {
            store: Arc::new(RwLock::new(StoreMap::new())),
            delete_policy: self.delete_policy,
        })
    }
}
