use std::sync::Arc;

use dadnovin::application::ports::VectorStore;
use dadnovin::application::services::{RetrievalError, RetrievalService};
use dadnovin::infrastructure::persistence::InMemoryVectorStore;

use crate::helpers::{FailingEmbedder, TableEmbedder, chunk};

async fn seeded_store() -> Arc<InMemoryVectorStore> {
    let store = Arc::new(InMemoryVectorStore::new());
    store
        .replace(vec![
            chunk("exact", [1.0, 0.0, 0.0]),
            chunk("close", [0.9, 0.1, 0.0]),
            chunk("weak", [0.05, 1.0, 0.0]),
            chunk("orthogonal", [0.0, 0.0, 1.0]),
        ])
        .await
        .unwrap();
    store
}

fn embedder() -> Arc<TableEmbedder> {
    Arc::new(TableEmbedder::new(&[("query", [1.0, 0.0, 0.0])]))
}

#[tokio::test]
async fn given_seeded_store_when_searching_then_returns_best_matches_above_threshold() {
    let service = RetrievalService::new(embedder(), seeded_store().await, 0.1);

    let results = service.similarity_search("query", 5).await.unwrap();

    let texts: Vec<&str> = results.iter().map(|r| r.chunk.text.as_str()).collect();
    assert_eq!(texts, vec!["exact", "close"]);
    assert!(results[0].score >= results[1].score);
}

#[tokio::test]
async fn given_k_smaller_than_matches_when_searching_then_truncates() {
    let service = RetrievalService::new(embedder(), seeded_store().await, 0.1);

    let results = service.similarity_search("query", 1).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk.text, "exact");
}

#[tokio::test]
async fn given_zero_k_when_searching_then_skips_embedding() {
    let embedder = embedder();
    let service = RetrievalService::new(embedder.clone(), seeded_store().await, 0.1);

    let results = service.similarity_search("query", 0).await.unwrap();

    assert!(results.is_empty());
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn given_empty_store_when_building_context_then_empty_without_embedding() {
    let embedder = embedder();
    let service = RetrievalService::new(embedder.clone(), Arc::new(InMemoryVectorStore::new()), 0.1);

    let context = service.context("query", 5).await.unwrap();

    assert_eq!(context, "");
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn given_matches_when_building_context_then_joins_with_newlines() {
    let service = RetrievalService::new(embedder(), seeded_store().await, 0.1);

    let context = service.context("query", 5).await.unwrap();

    assert_eq!(context, "exact\nclose");
}

#[tokio::test]
async fn given_failing_embedder_when_searching_then_embedding_error() {
    let service = RetrievalService::new(Arc::new(FailingEmbedder), seeded_store().await, 0.1);

    let result = service.similarity_search("query", 5).await;

    assert!(matches!(result, Err(RetrievalError::Embedding(_))));
}
