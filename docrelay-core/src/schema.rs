//! Collection schemas and the schema lookup interface.
//!
//! A [`Schema`] applies to one collection and constrains the shape of
//! document data. Schemas are enforced by the schema layer on writes only;
//! deletes and reads are never failed on schema grounds.

use bson::Bson;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::address::CollectionId;

/// The kind of value a field admits.
///
/// Numeric BSON representations (32/64-bit integers and doubles) collapse
/// into one `Number` kind, matching the normalized comparison the query
/// layer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Bool,
    Number,
    String,
    Binary,
    DateTime,
    Document,
    Array,
    /// Any value, including null.
    Any,
}

impl FieldKind {
    /// Whether `value` is admissible for this kind.
    pub fn admits(&self, value: &Bson) -> bool {
        match self {
            FieldKind::Bool => matches!(value, Bson::Boolean(_)),
            FieldKind::Number => {
                matches!(value, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_))
            }
            FieldKind::String => matches!(value, Bson::String(_)),
            FieldKind::Binary => matches!(value, Bson::Binary(_)),
            FieldKind::DateTime => matches!(value, Bson::DateTime(_)),
            FieldKind::Document => matches!(value, Bson::Document(_)),
            FieldKind::Array => matches!(value, Bson::Array(_)),
            FieldKind::Any => true,
        }
    }
}

/// Constraint on one named field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub kind: FieldKind,
    pub required: bool,
}

/// One violation found while validating data against a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub field: String,
    pub message: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field {}: {}", self.field, self.message)
    }
}

/// Shape constraints for the documents of one collection.
///
/// Fields not named by the schema are allowed; a schema only constrains what
/// it declares.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    fields: BTreeMap<String, FieldSchema>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// The declared field constraints.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSchema)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// Validates document data against this schema.
    ///
    /// A missing or null value counts as absent: absent required fields
    /// violate; absent optional fields pass. Present values must be
    /// admissible for the declared kind.
    pub fn validate(&self, data: &bson::Document) -> Result<(), Vec<SchemaViolation>> {
        let mut violations = Vec::new();

        for (name, field) in &self.fields {
            match data.get(name) {
                None | Some(Bson::Null) => {
                    if field.required {
                        violations.push(SchemaViolation {
                            field: name.clone(),
                            message: "required field is missing".to_string(),
                        });
                    }
                }
                Some(value) => {
                    if !field.kind.admits(value) {
                        violations.push(SchemaViolation {
                            field: name.clone(),
                            message: format!("value is not admissible for kind {:?}", field.kind),
                        });
                    }
                }
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Builder for [`Schema`] instances.
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    fields: BTreeMap<String, FieldSchema>,
}

impl SchemaBuilder {
    /// Declares a required field.
    pub fn required(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.insert(name.into(), FieldSchema { kind, required: true });
        self
    }

    /// Declares an optional field.
    pub fn optional(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.insert(name.into(), FieldSchema { kind, required: false });
        self
    }

    pub fn build(self) -> Schema {
        Schema { fields: self.fields }
    }
}

/// Mapping of collection id to schema, as produced by a schema read.
/// Unmanaged collections are simply absent.
pub type SchemaMap = HashMap<CollectionId, Schema>;

/// Lookup interface consumed by the schema-enforcing layer.
pub trait SchemaProvider: Send + Sync + fmt::Debug {
    /// The schema for `collection`, or `None` if the collection is unmanaged.
    fn schema(&self, collection: &CollectionId) -> Option<Schema>;
}

/// Map-backed provider for code-defined schemas.
#[derive(Debug, Clone, Default)]
pub struct StaticSchemaProvider {
    schemas: HashMap<CollectionId, Schema>,
}

impl StaticSchemaProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a schema for a collection.
    pub fn with(mut self, collection: CollectionId, schema: Schema) -> Self {
        self.schemas.insert(collection, schema);
        self
    }
}

impl SchemaProvider for StaticSchemaProvider {
    fn schema(&self, collection: &CollectionId) -> Option<Schema> {
        self.schemas.get(collection).cloned()
    }
}
