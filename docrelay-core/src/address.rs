//! Hierarchical addressing for collections, partitions, and documents.
//!
//! Addresses are plain value objects: they navigate and compare, nothing
//! else. A [`DocumentPath`] never caches document data; every read or write
//! against an address re-issues a request.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{DatabaseError, DatabaseResult};

/// Identifier of a named top-level collection. Non-empty by construction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionId(String);

impl CollectionId {
    /// Creates a collection id, rejecting empty strings.
    pub fn new(id: impl Into<String>) -> DatabaseResult<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(DatabaseError::InvalidId("collection id must not be empty".to_string()));
        }

        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CollectionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of a partition within a collection. Non-empty by construction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionId(String);

impl PartitionId {
    /// Creates a partition id, rejecting empty strings.
    pub fn new(id: impl Into<String>) -> DatabaseResult<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(DatabaseError::InvalidId("partition id must not be empty".to_string()));
        }

        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PartitionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of a document within a partition.
///
/// Ids are either client-supplied (any non-empty string) or generated by
/// [`DocumentId::generate`], which renders a 128-bit random value as 32
/// lowercase hexadecimal characters. Collision probability is negligible and
/// is not checked.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Creates a document id, rejecting empty strings.
    pub fn new(id: impl Into<String>) -> DatabaseResult<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(DatabaseError::InvalidId("document id must not be empty".to_string()));
        }

        Ok(Self(id))
    }

    /// Generates a fresh random id (32 lowercase hex characters).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().as_simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Address of a partition: the unit at which consistency is negotiated.
///
/// Equality is the (`collection`, `partition`) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartitionPath {
    pub collection: CollectionId,
    pub partition: PartitionId,
}

impl PartitionPath {
    pub fn new(collection: CollectionId, partition: PartitionId) -> Self {
        Self { collection, partition }
    }

    /// Extends this partition address with a document id.
    pub fn document(&self, document: DocumentId) -> DocumentPath {
        DocumentPath::new(self.clone(), document)
    }
}

impl fmt::Display for PartitionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.partition)
    }
}

/// Address of a single document within a partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentPath {
    pub partition: PartitionPath,
    pub document: DocumentId,
}

impl DocumentPath {
    pub fn new(partition: PartitionPath, document: DocumentId) -> Self {
        Self { partition, document }
    }

    pub fn collection_id(&self) -> &CollectionId {
        &self.partition.collection
    }

    pub fn partition_id(&self) -> &PartitionId {
        &self.partition.partition
    }

    pub fn document_id(&self) -> &DocumentId {
        &self.document
    }

    /// The not-found error for this address.
    pub fn not_found(&self) -> DatabaseError {
        DatabaseError::DocumentNotFound(
            self.document.to_string(),
            self.partition.partition.to_string(),
            self.partition.collection.to_string(),
        )
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.partition, self.document)
    }
}
