use std::sync::Arc;

use bson::doc;

use docrelay_core::{
    address::CollectionId,
    database::Database,
    error::DatabaseError,
    schema::{FieldKind, Schema, StaticSchemaProvider},
};
use docrelay_layers::SchemaLayer;
use docrelay_memory::MemoryAdapter;

fn users() -> CollectionId {
    CollectionId::new("users").unwrap()
}

fn user_schema() -> Schema {
    Schema::builder()
        .required("name", FieldKind::String)
        .optional("age", FieldKind::Number)
        .build()
}

fn database() -> Database<SchemaLayer<MemoryAdapter>> {
    let provider = Arc::new(StaticSchemaProvider::new().with(users(), user_schema()));

    Database::new(SchemaLayer::new(MemoryAdapter::new(), provider))
}

#[tokio::test]
async fn conforming_writes_pass_through() {
    let database = database();
    let partition = database.collection("users").unwrap().partition("eu").unwrap();

    let document = partition.insert(doc! { "name": "Alice", "age": 30 }).await.unwrap();
    document.update(doc! { "name": "Alice", "age": 31 }).await.unwrap();
    document.upsert(doc! { "name": "Alice" }).await.unwrap();
}

#[tokio::test]
async fn missing_required_field_is_rejected() {
    let database = database();
    let partition = database.collection("users").unwrap().partition("eu").unwrap();

    let result = partition.insert(doc! { "age": 30 }).await;

    assert!(matches!(result, Err(DatabaseError::SchemaValidation(_))));
}

#[tokio::test]
async fn kind_mismatch_is_rejected_on_every_write_kind() {
    let database = database();
    let partition = database.collection("users").unwrap().partition("eu").unwrap();
    let bad = doc! { "name": "Alice", "age": "thirty" };

    let insert = partition.insert(bad.clone()).await;
    assert!(matches!(insert, Err(DatabaseError::SchemaValidation(_))));

    let document = partition.document("alice").unwrap();
    let upsert = document.upsert(bad.clone()).await;
    assert!(matches!(upsert, Err(DatabaseError::SchemaValidation(_))));

    document.insert(doc! { "name": "Alice" }).await.unwrap();
    let update = document.update(bad).await;
    assert!(matches!(update, Err(DatabaseError::SchemaValidation(_))));
}

#[tokio::test]
async fn deletes_and_reads_are_never_failed_by_the_schema() {
    let database = database();
    let partition = database.collection("users").unwrap().partition("eu").unwrap();
    let document = partition.document("alice").unwrap();

    document.insert(doc! { "name": "Alice" }).await.unwrap();

    assert!(document.get().await.unwrap().is_some());
    document.delete().await.unwrap();
    assert!(document.get().await.unwrap().is_none());
}

#[tokio::test]
async fn unmanaged_collections_accept_any_shape() {
    let database = database();
    let partition = database.collection("scratch").unwrap().partition("eu").unwrap();

    partition.insert(doc! { "anything": [1, "two", true] }).await.unwrap();
}

#[tokio::test]
async fn schema_read_merges_the_provider_entries() {
    let database = database();

    let schema = database
        .collection("users")
        .unwrap()
        .read_schema()
        .await
        .unwrap();
    assert_eq!(schema, Some(user_schema()));

    let unmanaged = database
        .collection("scratch")
        .unwrap()
        .read_schema()
        .await
        .unwrap();
    assert_eq!(unmanaged, None);
}
