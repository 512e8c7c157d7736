//! Read-through document cache.
//!
//! [`CacheLayer`] keeps the last-known data of individual documents, keyed
//! by their full [`DocumentPath`]. Reads are served from the cache when
//! possible; successful writes update or invalidate the corresponding entry
//! *before* the write call returns, so a read issued after a write
//! completes never observes a strictly earlier value of the same document
//! (sequential consistency per key, not global ordering across keys).
//!
//! Entries have no automatic expiry. An optional capacity bounds the cache
//! with first-in-first-out eviction.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use async_trait::async_trait;
use futures::{StreamExt, future, stream};
use log::trace;
use mea::rwlock::RwLock;

use docrelay_core::{
    adapter::{Capabilities, DatabaseAdapter},
    address::DocumentPath,
    error::{DatabaseError, DatabaseResult},
    request::{
        DeleteRequest, InsertRequest, ReadRequest, SchemaReadRequest, SearchRequest,
        UpdateRequest, UpsertRequest,
    },
    snapshot::{QueryResultStream, SchemaMapStream, Snapshot, SnapshotStream},
};

#[derive(Debug)]
struct Entries {
    map: HashMap<DocumentPath, bson::Document>,
    order: VecDeque<DocumentPath>,
    capacity: Option<usize>,
}

impl Entries {
    fn new(capacity: Option<usize>) -> Self {
        Self {
            map: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    fn get(&self, path: &DocumentPath) -> Option<&bson::Document> {
        self.map.get(path)
    }

    fn put(&mut self, path: DocumentPath, data: bson::Document) {
        if self.map.insert(path.clone(), data).is_none() {
            self.order.push_back(path);

            if let Some(capacity) = self.capacity {
                while self.map.len() > capacity {
                    match self.order.pop_front() {
                        Some(oldest) => {
                            self.map.remove(&oldest);
                        }
                        None => break,
                    }
                }
            }
        }
    }

    fn remove(&mut self, path: &DocumentPath) {
        if self.map.remove(path).is_some() {
            self.order.retain(|entry| entry != path);
        }
    }
}

/// Entries plus the invalidation epoch guarding lazy stream-side plants.
#[derive(Debug)]
struct CacheStore {
    entries: RwLock<Entries>,
    /// Bumped (under the entries write lock) on every write-path mutation.
    /// A read records the epoch before forwarding; its stream may plant an
    /// observed snapshot only while the epoch is unchanged, so a plant
    /// racing a later write can never resurrect stale data.
    epoch: AtomicU64,
}

impl CacheStore {
    async fn apply_write(&self, path: &DocumentPath, data: Option<bson::Document>) {
        let mut entries = self.entries.write().await;
        self.epoch.fetch_add(1, Ordering::SeqCst);

        match data {
            Some(data) => entries.put(path.clone(), data),
            None => entries.remove(path),
        }
    }
}

/// Decorating adapter that caches document reads.
///
/// Read hits are answered without touching the inner adapter; misses
/// forward and plant the observed snapshot. Insert/update/upsert write the
/// new data through; delete invalidates. Search results flow through
/// unchanged and never plant entries.
#[derive(Debug)]
pub struct CacheLayer<A> {
    inner: A,
    store: Arc<CacheStore>,
}

impl<A: DatabaseAdapter> CacheLayer<A> {
    /// Wraps `inner` with an unbounded cache.
    pub fn new(inner: A) -> Self {
        Self::with_entries(inner, Entries::new(None))
    }

    /// Wraps `inner` with a cache bounded to `capacity` entries, evicting
    /// oldest-inserted first.
    pub fn with_capacity(inner: A, capacity: usize) -> Self {
        Self::with_entries(inner, Entries::new(Some(capacity)))
    }

    fn with_entries(inner: A, entries: Entries) -> Self {
        Self {
            inner,
            store: Arc::new(CacheStore {
                entries: RwLock::new(entries),
                epoch: AtomicU64::new(0),
            }),
        }
    }

    /// The wrapped inner adapter.
    pub fn inner(&self) -> &A {
        &self.inner
    }
}

#[async_trait]
impl<A: DatabaseAdapter> DatabaseAdapter for CacheLayer<A> {
    async fn perform_document_insert(
        &self,
        request: InsertRequest,
    ) -> DatabaseResult<DocumentPath> {
        let data = request.data.clone();
        let path = self.inner.perform_document_insert(request).await?;
        self.store.apply_write(&path, Some(data)).await;

        Ok(path)
    }

    async fn perform_document_upsert(
        &self,
        request: UpsertRequest,
    ) -> DatabaseResult<DocumentPath> {
        let data = request.data.clone();
        let path = self.inner.perform_document_upsert(request).await?;
        self.store.apply_write(&path, Some(data)).await;

        Ok(path)
    }

    async fn perform_document_update(&self, request: UpdateRequest) -> DatabaseResult<()> {
        let path = request.document.clone();
        let data = request.data.clone();
        self.inner.perform_document_update(request).await?;
        self.store.apply_write(&path, Some(data)).await;

        Ok(())
    }

    async fn perform_document_delete(&self, request: DeleteRequest) -> DatabaseResult<()> {
        let path = request.document.clone();
        self.inner.perform_document_delete(request).await?;
        self.store.apply_write(&path, None).await;

        Ok(())
    }

    async fn perform_document_read(&self, request: ReadRequest) -> DatabaseResult<SnapshotStream> {
        let path = request.document.clone();

        let cached = self.store.entries.read().await.get(&path).cloned();
        if let Some(data) = cached {
            trace!("cache hit for {path}");
            let snapshot = Snapshot::existing(path, data);

            return Ok(stream::once(future::ready(Ok::<_, DatabaseError>(snapshot))).boxed());
        }

        trace!("cache miss for {path}");
        let read_epoch = self.store.epoch.load(Ordering::SeqCst);
        let store = Arc::clone(&self.store);
        let inner_stream = self.inner.perform_document_read(request).await?;

        Ok(inner_stream
            .then(move |item| {
                let store = Arc::clone(&store);

                async move {
                    if let Ok(snapshot) = &item {
                        if snapshot.exists {
                            let mut entries = store.entries.write().await;

                            // Discard the plant if any write invalidated
                            // since this read began.
                            if store.epoch.load(Ordering::SeqCst) == read_epoch {
                                entries.put(snapshot.document.clone(), snapshot.data.clone());
                            }
                        }
                    }

                    item
                }
            })
            .boxed())
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
        self.inner.perform_schema_read(request).await
    }

    fn capabilities(&self) -> Capabilities {
        self.inner.capabilities()
    }

    async fn shutdown(self) -> DatabaseResult<()> {
        self.inner.shutdown().await
    }
}
