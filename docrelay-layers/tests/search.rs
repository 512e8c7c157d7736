use std::sync::Arc;

use bson::{Bson, doc};

use docrelay_core::{
    database::Database,
    query::{Filter, Query},
};
use docrelay_layers::SearchPromotionLayer;
use docrelay_memory::MemoryAdapter;

async fn seed(adapter: &MemoryAdapter, collection: &str, titles: &[&str]) {
    let database = Database::new(adapter.clone());
    let partition = database.collection(collection).unwrap().partition("all").unwrap();

    for title in titles {
        partition.insert(doc! { "title": *title }).await.unwrap();
    }
}

fn titles(result: &docrelay_core::snapshot::QueryResult) -> Vec<String> {
    let mut titles = result
        .snapshots
        .iter()
        .map(|snapshot| snapshot.get("title").and_then(Bson::as_str).unwrap().to_string())
        .collect::<Vec<_>>();
    titles.sort();

    titles
}

#[tokio::test]
async fn without_an_engine_full_text_degrades_to_a_scan_filter() {
    let backend = MemoryAdapter::new();
    seed(&backend, "posts", &["Rust Programming", "Programming Pearls", "Cooking"]).await;

    let database = Database::new(SearchPromotionLayer::new(backend));
    let partition = database.collection("posts").unwrap().partition("all").unwrap();

    // `matches` is demoted to a plain substring scan against the inner
    // adapter, so the comparison is case-sensitive.
    let result = partition
        .search(Query::builder().filter(Filter::matches("title", "Programming")).build())
        .await
        .unwrap();

    assert_eq!(titles(&result), vec!["Programming Pearls", "Rust Programming"]);
}

#[tokio::test]
async fn with_an_engine_full_text_searches_are_promoted() {
    let backend = MemoryAdapter::new();
    let engine = MemoryAdapter::new();

    // The engine indexes a different view of the data; a promoted search
    // must observably hit it rather than the backend.
    seed(&backend, "posts", &["stored only in the backend"]).await;
    seed(&engine, "posts", &["indexed only in the engine"]).await;

    let database = Database::new(SearchPromotionLayer::with_engine(
        backend,
        Arc::new(engine),
    ));
    let partition = database.collection("posts").unwrap().partition("all").unwrap();

    let promoted = partition
        .search(Query::builder().filter(Filter::matches("title", "indexed")).build())
        .await
        .unwrap();
    assert_eq!(titles(&promoted), vec!["indexed only in the engine"]);

    // Queries without full-text operators keep going to the inner adapter.
    let plain = partition.search(Query::new()).await.unwrap();
    assert_eq!(titles(&plain), vec!["stored only in the backend"]);
}

#[tokio::test]
async fn the_layer_reports_full_text_capability_only_with_an_engine() {
    let without = SearchPromotionLayer::new(MemoryAdapter::new());
    assert!(!Database::new(without).capabilities().full_text_search);

    let with = SearchPromotionLayer::with_engine(
        MemoryAdapter::new(),
        Arc::new(MemoryAdapter::new()),
    );
    assert!(Database::new(with).capabilities().full_text_search);
}

#[tokio::test]
async fn writes_pass_through_to_the_inner_adapter() {
    let backend = MemoryAdapter::new();
    let database = Database::new(SearchPromotionLayer::with_engine(
        backend.clone(),
        Arc::new(MemoryAdapter::new()),
    ));
    let partition = database.collection("posts").unwrap().partition("all").unwrap();

    let document = partition.insert(doc! { "title": "hello" }).await.unwrap();

    // Visible through the backend directly.
    let direct = Database::new(backend);
    let stored = direct
        .collection("posts")
        .unwrap()
        .partition("all")
        .unwrap()
        .document(document.id().as_str())
        .unwrap()
        .get()
        .await
        .unwrap();
    assert!(stored.is_some());
}
