//! Materialized reads, search results, and the streams that carry them.

use bson::Bson;
use futures::stream::BoxStream;

use crate::{
    address::{DocumentPath, PartitionPath},
    error::DatabaseResult,
    query::Query,
    schema::SchemaMap,
};

/// An immutable materialized read of a document at a point in time.
///
/// Snapshots are produced only by read and search operations and are never
/// mutated after construction. A snapshot with `exists == false` records the
/// observed absence of the document.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// The document this snapshot was taken of.
    pub document: DocumentPath,
    /// Field values at the time of the read.
    pub data: bson::Document,
    /// Whether the document existed at the time of the read.
    pub exists: bool,
}

impl Snapshot {
    /// Snapshot of an existing document.
    pub fn existing(document: DocumentPath, data: bson::Document) -> Self {
        Self { document, data, exists: true }
    }

    /// Snapshot recording an observed absence.
    pub fn missing(document: DocumentPath) -> Self {
        Self { document, data: bson::Document::new(), exists: false }
    }

    /// Convenience field access.
    pub fn get(&self, field: &str) -> Option<&Bson> {
        self.data.get(field)
    }
}

/// One emission of a search: the snapshots matching a query, ordered per the
/// query's resolved sorter.
///
/// An incremental search emits several of these with monotonically growing
/// snapshot sets; the last emission is always complete per the query's
/// `take`. Without a sorter the order is backend-defined and must not be
/// assumed stable across calls.
#[derive(Debug, Clone)]
pub struct QueryResult {
    /// The partition that was searched.
    pub partition: PartitionPath,
    /// The query that produced this result.
    pub query: Query,
    /// Matching snapshots in result order.
    pub snapshots: Vec<Snapshot>,
}

impl QueryResult {
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Lazy sequence of at most one snapshot for non-live backends; live
/// backends keep the stream open and push updated snapshots. Dropping the
/// stream cancels upstream work.
pub type SnapshotStream = BoxStream<'static, DatabaseResult<Snapshot>>;

/// Lazy sequence of query results; see [`QueryResult`] for the monotonic
/// growth contract of incremental searches.
pub type QueryResultStream = BoxStream<'static, DatabaseResult<QueryResult>>;

/// Lazy sequence of schema maps (at most one for non-live backends).
pub type SchemaMapStream = BoxStream<'static, DatabaseResult<SchemaMap>>;
