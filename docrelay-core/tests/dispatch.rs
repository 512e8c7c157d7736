//! The request/dispatch protocol: each request kind delegates to exactly one
//! adapter method, and request parameters arrive unchanged.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bson::doc;
use futures::{StreamExt, stream};

use docrelay_core::{
    adapter::{Capabilities, DatabaseAdapter},
    address::{CollectionId, DocumentId, DocumentPath, PartitionId, PartitionPath},
    database::Database,
    error::{DatabaseError, DatabaseResult},
    query::Query,
    reach::Reach,
    request::{
        DeleteRequest, InsertRequest, Operation, ReadRequest, SchemaReadRequest, SearchRequest,
        UpdateRequest, UpsertRequest,
    },
    schema::SchemaMap,
    snapshot::{QueryResult, QueryResultStream, SchemaMapStream, Snapshot, SnapshotStream},
};

/// Terminal adapter that records which method each dispatch lands on.
#[derive(Debug, Clone, Default)]
struct RecordingAdapter {
    operations: Arc<Mutex<Vec<(Operation, Reach)>>>,
}

impl RecordingAdapter {
    fn record(&self, operation: Operation, reach: Reach) {
        self.operations.lock().unwrap().push((operation, reach));
    }

    fn recorded(&self) -> Vec<(Operation, Reach)> {
        self.operations.lock().unwrap().clone()
    }
}

#[async_trait]
impl DatabaseAdapter for RecordingAdapter {
    async fn perform_document_insert(
        &self,
        request: InsertRequest,
    ) -> DatabaseResult<DocumentPath> {
        self.record(Operation::Insert, request.reach);
        let id = request.document.unwrap_or_else(DocumentId::generate);
        Ok(request.partition.document(id))
    }

    async fn perform_document_upsert(
        &self,
        request: UpsertRequest,
    ) -> DatabaseResult<DocumentPath> {
        self.record(Operation::Upsert, request.reach);
        let id = request.document.unwrap_or_else(DocumentId::generate);
        Ok(request.partition.document(id))
    }

    async fn perform_document_update(&self, request: UpdateRequest) -> DatabaseResult<()> {
        self.record(Operation::Update, request.reach);
        Ok(())
    }

    async fn perform_document_delete(&self, request: DeleteRequest) -> DatabaseResult<()> {
        self.record(Operation::Delete, request.reach);
        Ok(())
    }

    async fn perform_document_read(&self, request: ReadRequest) -> DatabaseResult<SnapshotStream> {
        self.record(Operation::Read, request.reach);
        Ok(stream::empty::<DatabaseResult<Snapshot>>().boxed())
    }

    async fn perform_document_search(
        &self,
        request: SearchRequest,
    ) -> DatabaseResult<QueryResultStream> {
        self.record(Operation::Search, request.reach);
        let result = QueryResult {
            partition: request.partition,
            query: request.query,
            snapshots: Vec::new(),
        };
        Ok(stream::iter([Ok::<_, DatabaseError>(result)]).boxed())
    }

    async fn perform_schema_read(
        &self,
        request: SchemaReadRequest,
    ) -> DatabaseResult<SchemaMapStream> {
        self.record(Operation::SchemaRead, request.reach);
        Ok(stream::iter([Ok::<_, DatabaseError>(SchemaMap::new())]).boxed())
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::local()
    }
}

fn partition_path() -> PartitionPath {
    PartitionPath::new(
        CollectionId::new("users").unwrap(),
        PartitionId::new("eu").unwrap(),
    )
}

#[tokio::test]
async fn each_request_kind_maps_to_its_own_adapter_method() {
    let adapter = RecordingAdapter::default();
    let path = partition_path().document(DocumentId::new("alice").unwrap());

    InsertRequest {
        partition: partition_path(),
        document: None,
        data: doc! {},
        reach: Reach::Local,
    }
    .delegate_to(&adapter)
    .await
    .unwrap();

    UpsertRequest {
        partition: partition_path(),
        document: Some(path.document.clone()),
        data: doc! {},
        reach: Reach::Local,
    }
    .delegate_to(&adapter)
    .await
    .unwrap();

    UpdateRequest { document: path.clone(), data: doc! {}, reach: Reach::Local }
        .delegate_to(&adapter)
        .await
        .unwrap();

    DeleteRequest { document: path.clone(), reach: Reach::Local }
        .delegate_to(&adapter)
        .await
        .unwrap();

    ReadRequest { document: path.clone(), reach: Reach::Local }
        .delegate_to(&adapter)
        .await
        .unwrap();

    SearchRequest {
        partition: partition_path(),
        query: Query::new(),
        chunking: None,
        reach: Reach::Local,
    }
    .delegate_to(&adapter)
    .await
    .unwrap();

    SchemaReadRequest { collection: CollectionId::new("users").unwrap(), reach: Reach::Local }
        .delegate_to(&adapter)
        .await
        .unwrap();

    let operations = adapter
        .recorded()
        .into_iter()
        .map(|(operation, _)| operation)
        .collect::<Vec<_>>();

    assert_eq!(
        operations,
        vec![
            Operation::Insert,
            Operation::Upsert,
            Operation::Update,
            Operation::Delete,
            Operation::Read,
            Operation::Search,
            Operation::SchemaRead,
        ]
    );
}

#[tokio::test]
async fn facade_requests_carry_the_handle_reach() {
    let adapter = RecordingAdapter::default();
    let database = Database::new(adapter.clone()).with_reach(Reach::Server);
    let partition = database.collection("users").unwrap().partition("eu").unwrap();

    partition.insert(doc! { "name": "Alice" }).await.unwrap();
    partition
        .with_reach(Reach::Global)
        .new_document()
        .upsert(doc! { "name": "Bob" })
        .await
        .unwrap();

    assert_eq!(
        adapter.recorded(),
        vec![(Operation::Insert, Reach::Server), (Operation::Upsert, Reach::Global)]
    );
}

#[tokio::test]
async fn insert_returns_backend_assigned_document_handle() {
    let adapter = RecordingAdapter::default();
    let database = Database::new(adapter);
    let partition = database.collection("users").unwrap().partition("eu").unwrap();

    let document = partition.insert(doc! { "name": "Alice" }).await.unwrap();

    assert_eq!(document.path().partition, *partition.path());
    assert_eq!(document.id().as_str().len(), 32);
}

#[tokio::test]
async fn missing_document_read_yields_none() {
    let adapter = RecordingAdapter::default();
    let database = Database::new(adapter);
    let document = database
        .collection("users")
        .unwrap()
        .partition("eu")
        .unwrap()
        .document("ghost")
        .unwrap();

    assert!(document.get().await.unwrap().is_none());
}

/// Adapter that refuses everything; used to check error propagation.
#[derive(Debug, Default)]
struct RefusingAdapter;

#[async_trait]
impl DatabaseAdapter for RefusingAdapter {
    async fn perform_document_insert(
        &self,
        _request: InsertRequest,
    ) -> DatabaseResult<DocumentPath> {
        Err(DatabaseError::Capability("read-only adapter".to_string()))
    }

    async fn perform_document_upsert(
        &self,
        _request: UpsertRequest,
    ) -> DatabaseResult<DocumentPath> {
        Err(DatabaseError::Capability("read-only adapter".to_string()))
    }

    async fn perform_document_update(&self, _request: UpdateRequest) -> DatabaseResult<()> {
        Err(DatabaseError::Capability("read-only adapter".to_string()))
    }

    async fn perform_document_delete(&self, _request: DeleteRequest) -> DatabaseResult<()> {
        Err(DatabaseError::Capability("read-only adapter".to_string()))
    }

    async fn perform_document_read(
        &self,
        _request: ReadRequest,
    ) -> DatabaseResult<SnapshotStream> {
        Ok(stream::empty::<DatabaseResult<Snapshot>>().boxed())
    }

    async fn perform_document_search(
        &self,
        _request: SearchRequest,
    ) -> DatabaseResult<QueryResultStream> {
        // Failure surfaced as a failed stream termination.
        Ok(stream::iter([Err::<QueryResult, _>(DatabaseError::Backend(
            "search index unavailable".to_string(),
        ))])
        .boxed())
    }

    async fn perform_schema_read(
        &self,
        _request: SchemaReadRequest,
    ) -> DatabaseResult<SchemaMapStream> {
        Ok(stream::empty::<DatabaseResult<SchemaMap>>().boxed())
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::local()
    }
}

#[tokio::test]
async fn failures_surface_as_failed_results_and_stream_terminations() {
    let database = Database::new(RefusingAdapter);
    let partition = database.collection("users").unwrap().partition("eu").unwrap();

    let insert = partition.insert(doc! {}).await;
    assert!(matches!(insert, Err(DatabaseError::Capability(_))));

    let search = partition.search(Query::new()).await;
    assert!(matches!(search, Err(DatabaseError::Backend(_))));
}
