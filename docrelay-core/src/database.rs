//! The database facade: collection, partition, and document handles.
//!
//! Handles are cheap addressing views over a root adapter. They hold no
//! document data — every operation constructs one request value and
//! delegates it to the adapter chain. Each handle carries the default
//! [`Reach`] its requests are issued with; `with_reach` derives a handle
//! with a different requirement.
//!
//! # Example
//!
//! ```ignore
//! use docrelay_core::database::Database;
//!
//! let database = Database::new(adapter);
//! let partition = database.collection("users")?.partition("eu")?;
//!
//! let doc = partition.insert(doc! { "name": "Alice" }).await?;
//! let snapshot = doc.get().await?;
//! ```

use futures::StreamExt;
use std::num::NonZeroUsize;

use crate::{
    adapter::{Capabilities, DatabaseAdapter},
    address::{CollectionId, DocumentId, DocumentPath, PartitionId, PartitionPath},
    error::{DatabaseError, DatabaseResult},
    query::Query,
    reach::Reach,
    request::{
        DeleteRequest, InsertRequest, ReadRequest, SchemaReadRequest, SearchRequest,
        UpdateRequest, UpsertRequest,
    },
    schema::Schema,
    snapshot::{QueryResult, QueryResultStream, Snapshot, SnapshotStream},
};

/// Chunk size `search_and_delete` uses for its streaming search.
const SEARCH_AND_DELETE_CHUNKING: usize = 64;

/// Binds a root adapter and produces collection handles.
#[derive(Debug)]
pub struct Database<A: DatabaseAdapter> {
    adapter: A,
    reach: Reach,
}

impl<A: DatabaseAdapter> Database<A> {
    /// Creates a database over the given root adapter, defaulting to
    /// [`Reach::Local`].
    pub fn new(adapter: A) -> Self {
        Self { adapter, reach: Reach::default() }
    }

    /// Sets the default reach for handles derived from this database.
    pub fn with_reach(mut self, reach: Reach) -> Self {
        self.reach = reach;
        self
    }

    /// The root adapter of the chain.
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Capabilities of the bound adapter chain.
    pub fn capabilities(&self) -> Capabilities {
        self.adapter.capabilities()
    }

    /// A handle to the named collection. Collections come into being lazily
    /// on first write; the handle itself performs no I/O.
    pub fn collection(&self, id: impl Into<String>) -> DatabaseResult<Collection<'_, A>> {
        Ok(Collection {
            adapter: &self.adapter,
            id: CollectionId::new(id)?,
            reach: self.reach,
        })
    }

    /// Shuts down the adapter chain, releasing backend resources.
    pub async fn shutdown(self) -> DatabaseResult<()> {
        self.adapter.shutdown().await
    }
}

/// Handle to a named top-level collection.
#[derive(Debug)]
pub struct Collection<'a, A: DatabaseAdapter> {
    adapter: &'a A,
    id: CollectionId,
    reach: Reach,
}

impl<'a, A: DatabaseAdapter> Collection<'a, A> {
    pub fn id(&self) -> &CollectionId {
        &self.id
    }

    /// Derives a handle requiring a different reach.
    pub fn with_reach(mut self, reach: Reach) -> Self {
        self.reach = reach;
        self
    }

    /// A handle to the named partition of this collection.
    pub fn partition(&self, id: impl Into<String>) -> DatabaseResult<Partition<'a, A>> {
        Ok(Partition {
            adapter: self.adapter,
            path: PartitionPath::new(self.id.clone(), PartitionId::new(id)?),
            reach: self.reach,
        })
    }

    /// Reads this collection's schema, or `None` if it is unmanaged.
    pub async fn read_schema(&self) -> DatabaseResult<Option<Schema>> {
        let request = SchemaReadRequest { collection: self.id.clone(), reach: self.reach };
        let mut stream = request.delegate_to(self.adapter).await?;

        match stream.next().await {
            Some(map) => {
                let mut map = map?;
                Ok(map.remove(&self.id))
            }
            None => Ok(None),
        }
    }
}

/// Handle to one partition: the unit documents are addressed and searched
/// in, and the level at which consistency is negotiated.
#[derive(Debug)]
pub struct Partition<'a, A: DatabaseAdapter> {
    adapter: &'a A,
    path: PartitionPath,
    reach: Reach,
}

impl<'a, A: DatabaseAdapter> Partition<'a, A> {
    pub fn path(&self) -> &PartitionPath {
        &self.path
    }

    pub fn collection_id(&self) -> &CollectionId {
        &self.path.collection
    }

    pub fn partition_id(&self) -> &PartitionId {
        &self.path.partition
    }

    /// Derives a handle requiring a different reach.
    pub fn with_reach(mut self, reach: Reach) -> Self {
        self.reach = reach;
        self
    }

    /// A handle to the document with the given id. No existence check is
    /// performed; the handle is just an address.
    pub fn document(&self, id: impl Into<String>) -> DatabaseResult<Document<'a, A>> {
        Ok(Document {
            adapter: self.adapter,
            path: self.path.document(DocumentId::new(id)?),
            reach: self.reach,
        })
    }

    /// A handle to a not-yet-written document with a freshly generated id.
    pub fn new_document(&self) -> Document<'a, A> {
        Document {
            adapter: self.adapter,
            path: self.path.document(DocumentId::generate()),
            reach: self.reach,
        }
    }

    /// Inserts a new document, letting the backend assign the id. Returns
    /// the handle to the created document.
    pub async fn insert(&self, data: bson::Document) -> DatabaseResult<Document<'a, A>> {
        let request = InsertRequest {
            partition: self.path.clone(),
            document: None,
            data,
            reach: self.reach,
        };
        let path = request.delegate_to(self.adapter).await?;

        Ok(Document { adapter: self.adapter, path, reach: self.reach })
    }

    /// Upserts a document under a freshly generated id and returns its
    /// handle. The id is generated before dispatch so the request addresses
    /// a concrete document.
    pub async fn upsert(&self, data: bson::Document) -> DatabaseResult<Document<'a, A>> {
        let request = UpsertRequest {
            partition: self.path.clone(),
            document: Some(DocumentId::generate()),
            data,
            reach: self.reach,
        };
        let path = request.delegate_to(self.adapter).await?;

        Ok(Document { adapter: self.adapter, path, reach: self.reach })
    }

    /// Searches this partition and returns the final, complete result
    /// (equivalent to draining [`Partition::search_incrementally`] and
    /// keeping the last emission).
    pub async fn search(&self, query: Query) -> DatabaseResult<QueryResult> {
        let request = SearchRequest {
            partition: self.path.clone(),
            query,
            chunking: None,
            reach: self.reach,
        };
        let mut stream = request.delegate_to(self.adapter).await?;

        let mut last = None;
        while let Some(result) = stream.next().await {
            last = Some(result?);
        }

        last.ok_or_else(|| {
            DatabaseError::Backend("search stream terminated without a result".to_string())
        })
    }

    /// Searches this partition incrementally: the stream emits results with
    /// monotonically growing snapshot sets, letting the caller start
    /// consuming before the full set is available. The final emission is
    /// complete per the query's `take`. Dropping the stream cancels the
    /// search.
    pub async fn search_incrementally(
        &self,
        query: Query,
        chunking: NonZeroUsize,
    ) -> DatabaseResult<QueryResultStream> {
        let request = SearchRequest {
            partition: self.path.clone(),
            query,
            chunking: Some(chunking),
            reach: self.reach,
        };

        request.delegate_to(self.adapter).await
    }

    /// Searches with the chunked strategy and deletes every matched
    /// document. Returns the number of documents deleted.
    pub async fn search_and_delete(&self, query: Query) -> DatabaseResult<usize> {
        let chunking = NonZeroUsize::new(SEARCH_AND_DELETE_CHUNKING)
            .ok_or_else(|| DatabaseError::Backend("invalid chunk size".to_string()))?;
        let mut stream = self.search_incrementally(query, chunking).await?;

        // Only the final emission is complete; earlier ones are prefixes of it.
        let mut last = None;
        while let Some(result) = stream.next().await {
            last = Some(result?);
        }

        let Some(result) = last else {
            return Ok(0);
        };

        let mut deleted = 0;
        for snapshot in result.snapshots {
            let request = DeleteRequest { document: snapshot.document, reach: self.reach };
            request.delegate_to(self.adapter).await?;
            deleted += 1;
        }

        log::debug!("search-and-delete removed {deleted} documents from {}", self.path);

        Ok(deleted)
    }
}

impl<'a, A: DatabaseAdapter> PartialEq for Partition<'a, A> {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

/// Handle to one addressable document. Holds the address only — the value is
/// never cached in the handle; every read and write re-issues a request.
#[derive(Debug)]
pub struct Document<'a, A: DatabaseAdapter> {
    adapter: &'a A,
    path: DocumentPath,
    reach: Reach,
}

impl<'a, A: DatabaseAdapter> Document<'a, A> {
    pub fn path(&self) -> &DocumentPath {
        &self.path
    }

    pub fn id(&self) -> &DocumentId {
        &self.path.document
    }

    /// Derives a handle requiring a different reach.
    pub fn with_reach(mut self, reach: Reach) -> Self {
        self.reach = reach;
        self
    }

    /// Inserts this document with its explicit id; fails if it already
    /// exists.
    pub async fn insert(&self, data: bson::Document) -> DatabaseResult<()> {
        let request = InsertRequest {
            partition: self.path.partition.clone(),
            document: Some(self.path.document.clone()),
            data,
            reach: self.reach,
        };
        request.delegate_to(self.adapter).await?;

        Ok(())
    }

    /// Creates or replaces this document. Idempotent.
    pub async fn upsert(&self, data: bson::Document) -> DatabaseResult<()> {
        let request = UpsertRequest {
            partition: self.path.partition.clone(),
            document: Some(self.path.document.clone()),
            data,
            reach: self.reach,
        };
        request.delegate_to(self.adapter).await?;

        Ok(())
    }

    /// Replaces this document; fails with `DocumentNotFound` if it does not
    /// exist.
    pub async fn update(&self, data: bson::Document) -> DatabaseResult<()> {
        let request = UpdateRequest {
            document: self.path.clone(),
            data,
            reach: self.reach,
        };

        request.delegate_to(self.adapter).await
    }

    /// Deletes this document, subject to the adapter's delete policy for
    /// absent documents.
    pub async fn delete(&self) -> DatabaseResult<()> {
        let request = DeleteRequest { document: self.path.clone(), reach: self.reach };

        request.delegate_to(self.adapter).await
    }

    /// Reads this document as a lazy snapshot stream. Non-live backends
    /// yield at most one snapshot; an absent document yields an empty
    /// stream.
    pub async fn read(&self) -> DatabaseResult<SnapshotStream> {
        let request = ReadRequest { document: self.path.clone(), reach: self.reach };

        request.delegate_to(self.adapter).await
    }

    /// Reads the first snapshot of this document, or `None` if it does not
    /// exist.
    pub async fn get(&self) -> DatabaseResult<Option<Snapshot>> {
        let mut stream = self.read().await?;

        match stream.next().await {
            Some(snapshot) => {
                let snapshot = snapshot?;
                Ok(snapshot.exists.then_some(snapshot))
            }
            None => Ok(None),
        }
    }
}

impl<'a, A: DatabaseAdapter> PartialEq for Document<'a, A> {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}
