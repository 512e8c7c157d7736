//! Convenient re-exports of commonly used types from docrelay.
//!
//! Import this prelude module to quickly access the most frequently used
//! types and traits without importing from multiple sub-modules:
//!
//! ```ignore
//! use docrelay::prelude::*;
//! ```

pub use docrelay_core::{
    adapter::{AdapterBuilder, Capabilities, DatabaseAdapter},
    address::{CollectionId, DocumentId, DocumentPath, PartitionId, PartitionPath},
    database::{Collection, Database, Document, Partition},
    error::{DatabaseError, DatabaseResult},
    query::{Expr, FieldOp, Filter, Query, QueryBuilder, QueryVisitor, SortDirection, SortKey, Sorter},
    reach::Reach,
    request::{
        DeleteRequest, InsertRequest, Operation, ReadRequest, SchemaReadRequest, SearchRequest,
        UpdateRequest, UpsertRequest,
    },
    schema::{FieldKind, FieldSchema, Schema, SchemaMap, SchemaProvider, StaticSchemaProvider},
    snapshot::{QueryResult, QueryResultStream, SchemaMapStream, Snapshot, SnapshotStream},
};
