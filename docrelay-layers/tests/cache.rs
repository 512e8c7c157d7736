use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use bson::{Bson, doc};

use docrelay_core::{
    adapter::{Capabilities, DatabaseAdapter},
    address::DocumentPath,
    database::Database,
    error::DatabaseResult,
    request::{
        DeleteRequest, InsertRequest, ReadRequest, SchemaReadRequest, SearchRequest,
        UpdateRequest, UpsertRequest,
    },
    snapshot::{QueryResultStream, SchemaMapStream, SnapshotStream},
};
use docrelay_layers::CacheLayer;
use docrelay_memory::MemoryAdapter;

/// Terminal wrapper that counts how many reads reach the backend.
#[derive(Debug, Clone)]
struct CountingAdapter {
    inner: MemoryAdapter,
    reads: Arc<AtomicUsize>,
}

impl CountingAdapter {
    fn new() -> Self {
        Self {
            inner: MemoryAdapter::new(),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatabaseAdapter for CountingAdapter {
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
        self.reads.fetch_add(1, Ordering::SeqCst);
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
        self.inner.perform_schema_read(request).await
    }

    fn capabilities(&self) -> Capabilities {
        self.inner.capabilities()
    }
}

#[tokio::test]
async fn repeated_reads_are_served_from_the_cache() {
    let backend = CountingAdapter::new();
    let database = Database::new(CacheLayer::new(backend.clone()));
    let partition = database.collection("users").unwrap().partition("eu").unwrap();
    let document = partition.document("alice").unwrap();

    document.insert(doc! { "name": "Alice" }).await.unwrap();

    // The write planted the entry; no read needs the backend.
    for _ in 0..3 {
        let snapshot = document.get().await.unwrap().expect("document exists");
        assert_eq!(snapshot.get("name").and_then(Bson::as_str), Some("Alice"));
    }

    assert_eq!(backend.reads(), 0);
}

#[tokio::test]
async fn a_miss_forwards_once_and_plants_the_entry() {
    let backend = CountingAdapter::new();

    // Write directly to the backend so the cache has no entry.
    {
        let database = Database::new(backend.clone());
        let partition = database.collection("users").unwrap().partition("eu").unwrap();
        partition.document("alice").unwrap().insert(doc! { "n": 1 }).await.unwrap();
    }

    let database = Database::new(CacheLayer::new(backend.clone()));
    let partition = database.collection("users").unwrap().partition("eu").unwrap();
    let document = partition.document("alice").unwrap();

    assert!(document.get().await.unwrap().is_some());
    assert!(document.get().await.unwrap().is_some());

    assert_eq!(backend.reads(), 1);
}

#[tokio::test]
async fn a_read_after_a_write_returns_reflects_the_write() {
    let database = Database::new(CacheLayer::new(MemoryAdapter::new()));
    let partition = database.collection("users").unwrap().partition("eu").unwrap();
    let document = partition.document("alice").unwrap();

    document.insert(doc! { "age": 30 }).await.unwrap();
    let snapshot = document.get().await.unwrap().expect("document exists");
    assert_eq!(snapshot.get("age").and_then(Bson::as_i32), Some(30));

    document.update(doc! { "age": 31 }).await.unwrap();
    let snapshot = document.get().await.unwrap().expect("document exists");
    assert_eq!(snapshot.get("age").and_then(Bson::as_i32), Some(31));

    document.upsert(doc! { "age": 32 }).await.unwrap();
    let snapshot = document.get().await.unwrap().expect("document exists");
    assert_eq!(snapshot.get("age").and_then(Bson::as_i32), Some(32));
}

#[tokio::test]
async fn delete_invalidates_the_cached_entry() {
    let database = Database::new(CacheLayer::new(MemoryAdapter::new()));
    let partition = database.collection("users").unwrap().partition("eu").unwrap();
    let document = partition.document("alice").unwrap();

    document.insert(doc! { "name": "Alice" }).await.unwrap();
    assert!(document.get().await.unwrap().is_some());

    document.delete().await.unwrap();
    assert!(document.get().await.unwrap().is_none());
}

#[tokio::test]
async fn capacity_evicts_oldest_entries_first() {
    let backend = CountingAdapter::new();
    let database = Database::new(CacheLayer::with_capacity(backend.clone(), 2));
    let partition = database.collection("users").unwrap().partition("eu").unwrap();

    let first = partition.document("a").unwrap();
    let second = partition.document("b").unwrap();
    let third = partition.document("c").unwrap();

    first.insert(doc! {}).await.unwrap();
    second.insert(doc! {}).await.unwrap();
    third.insert(doc! {}).await.unwrap();

    // "b" and "c" are still cached; "a" was evicted and goes to the backend.
    assert!(third.get().await.unwrap().is_some());
    assert!(second.get().await.unwrap().is_some());
    assert_eq!(backend.reads(), 0);

    assert!(first.get().await.unwrap().is_some());
    assert_eq!(backend.reads(), 1);
}

#[tokio::test]
async fn errors_from_the_inner_adapter_are_not_swallowed() {
    use docrelay_core::error::DatabaseError;

    let database = Database::new(CacheLayer::new(MemoryAdapter::new()));
    let partition = database.collection("users").unwrap().partition("eu").unwrap();
    let document = partition.document("ghost").unwrap();

    let result = document.update(doc! { "age": 1 }).await;
    assert!(matches!(result, Err(DatabaseError::DocumentNotFound(..))));

    // The failed update must not have planted anything.
    assert!(document.get().await.unwrap().is_none());
}
