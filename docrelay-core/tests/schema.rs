use bson::doc;
use docrelay_core::{
    address::CollectionId,
    reach::Reach,
    schema::{FieldKind, Schema, SchemaProvider, StaticSchemaProvider},
};

fn user_schema() -> Schema {
    Schema::builder()
        .required("name", FieldKind::String)
        .optional("age", FieldKind::Number)
        .build()
}

#[test]
fn valid_data_passes() {
    assert!(user_schema().validate(&doc! { "name": "Alice", "age": 30 }).is_ok());
}

#[test]
fn optional_fields_may_be_absent_or_null() {
    let schema = user_schema();

    assert!(schema.validate(&doc! { "name": "Alice" }).is_ok());
    assert!(schema.validate(&doc! { "name": "Alice", "age": null }).is_ok());
}

#[test]
fn missing_required_field_violates() {
    let violations = user_schema().validate(&doc! { "age": 30 }).unwrap_err();

    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].field, "name");
}

#[test]
fn kind_mismatch_violates() {
    let violations = user_schema()
        .validate(&doc! { "name": "Alice", "age": "thirty" })
        .unwrap_err();

    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].field, "age");
}

#[test]
fn undeclared_fields_are_allowed() {
    assert!(user_schema()
        .validate(&doc! { "name": "Alice", "nickname": "Al" })
        .is_ok());
}

#[test]
fn number_kind_admits_all_numeric_representations() {
    let schema = Schema::builder().required("n", FieldKind::Number).build();

    assert!(schema.validate(&doc! { "n": 1_i32 }).is_ok());
    assert!(schema.validate(&doc! { "n": 1_i64 }).is_ok());
    assert!(schema.validate(&doc! { "n": 1.5_f64 }).is_ok());
    assert!(schema.validate(&doc! { "n": "1" }).is_err());
}

#[test]
fn static_provider_returns_schemas_for_managed_collections_only() {
    let users = CollectionId::new("users").unwrap();
    let orders = CollectionId::new("orders").unwrap();
    let provider = StaticSchemaProvider::new().with(users.clone(), user_schema());

    assert_eq!(provider.schema(&users), Some(user_schema()));
    assert_eq!(provider.schema(&orders), None);
}

#[test]
fn reach_levels_are_totally_ordered() {
    assert!(Reach::Local < Reach::Server);
    assert!(Reach::Server < Reach::Global);
    assert_eq!(Reach::default(), Reach::Local);
    assert_eq!(Reach::Global.to_string(), "global");
}
