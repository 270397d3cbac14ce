//! HTTP client against the in-process mock service.

mod common;

use docchat::client::HttpServiceClient;
use docchat_core::{
    AlgorithmId, ChatReply, FilterSet, GenerationRequest, GenerationService, RetrievalService,
    SearchRequest,
};
use reqwest::Url;
use std::time::Duration;

fn client(base_url: &str) -> HttpServiceClient {
    HttpServiceClient::new(Url::parse(base_url).unwrap(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_search_wire_shape_and_order() {
    let mock = common::spawn().await;
    let client = client(&mock.base_url);

    let mut filters = FilterSet::new();
    filters.toggle("ProjectB");
    filters.toggle("ProjectA");
    let request = SearchRequest::new("  ranking ", AlgorithmId::Bm25, filters).unwrap();
    let hits = client.search(&request).await.unwrap();

    let names: Vec<&str> = hits.iter().map(|h| h.filename.as_str()).collect();
    assert_eq!(names, vec!["ProjectA/ir.pdf", "ProjectB/bm25.txt"]);
    assert_eq!(hits[0].metadata.file_type, "PDF");
    assert_eq!(hits[0].key_points.len(), 2);
    assert_eq!(hits[0].images[0].page(), Some(1));
    assert!(hits[0].sub_scores.is_empty());

    let recorded = mock.recorded();
    assert_eq!(
        recorded.searches[0],
        serde_json::json!({
            "query": "ranking",
            "search_type": "bm25",
            "filter_files": ["ProjectA", "ProjectB"]
        })
    );
}

#[tokio::test]
async fn test_hybrid_hits_carry_sub_scores() {
    let mock = common::spawn().await;
    let request = SearchRequest::new("ir", AlgorithmId::Hybrid, FilterSet::new()).unwrap();
    let hits = client(&mock.base_url).search(&request).await.unwrap();
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].sub_scores.semantic_score, Some(0.7));
    assert_eq!(hits[0].method, "hybrid");
}

#[tokio::test]
async fn test_search_error_status_uses_error_body() {
    let mock = common::spawn().await;
    mock.fail_search(true);
    let request = SearchRequest::new("ir", AlgorithmId::Hybrid, FilterSet::new()).unwrap();
    let err = client(&mock.base_url).search(&request).await.unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("500"), "{}", message);
    assert!(message.contains("Search failed"), "{}", message);
}

#[tokio::test]
async fn test_list_files() {
    let mock = common::spawn().await;
    let domain = client(&mock.base_url).list_files().await.unwrap();
    assert_eq!(domain.folders, vec!["ProjectA", "ProjectB"]);
    assert!(domain.contains("notes.txt"));
    assert_eq!(mock.recorded().file_listings, 1);
}

#[tokio::test]
async fn test_chat_round_trip() {
    let mock = common::spawn().await;
    let client = client(&mock.base_url);
    let request = SearchRequest::new("ir", AlgorithmId::Hybrid, FilterSet::new()).unwrap();
    let hits = client.search(&request).await.unwrap();

    let reply: ChatReply = client
        .chat(&GenerationRequest {
            query: "What is IR?".into(),
            search_results: hits,
            conversation_history: Vec::new(),
        })
        .await
        .unwrap();
    assert!(reply.response.unwrap().starts_with("**Answer** to What is IR?"));
    assert_eq!(reply.sources.unwrap().len(), 4);

    let recorded = mock.recorded();
    let body = &recorded.chats[0];
    assert_eq!(body["query"], "What is IR?");
    assert_eq!(body["search_results"].as_array().unwrap().len(), 3);
    assert_eq!(body["conversation_history"], serde_json::json!([]));
}

#[tokio::test]
async fn test_unreachable_service_is_an_error() {
    let client = client(&common::closed_url());
    let request = SearchRequest::new("ir", AlgorithmId::Hybrid, FilterSet::new()).unwrap();
    assert!(client.search(&request).await.is_err());
    assert!(client.list_files().await.is_err());
}

#[tokio::test]
async fn test_reload() {
    let mock = common::spawn().await;
    let report = client(&mock.base_url).reload().await.unwrap();
    assert_eq!(report.message, "Documents reloaded");
    assert_eq!(report.doc_count, 3);
    assert_eq!(mock.recorded().reloads, 1);
}

#[tokio::test]
async fn test_upload_success_and_rejection() {
    let mock = common::spawn().await;
    let client = client(&mock.base_url);
    let dir = tempfile::tempdir().unwrap();

    let good = dir.path().join("paper.txt");
    std::fs::write(&good, b"some text").unwrap();
    let report = client.upload(&good).await.unwrap();
    assert!(report.is_success());
    assert_eq!(report.filename.as_deref(), Some("paper.txt"));
    assert_eq!(report.total_documents, Some(4));

    let bad = dir.path().join("tool.exe");
    std::fs::write(&bad, b"MZ").unwrap();
    let report = client.upload(&bad).await.unwrap();
    assert!(!report.is_success());
    assert_eq!(report.error.as_deref(), Some("File type not allowed"));

    let recorded = mock.recorded();
    assert_eq!(recorded.uploads.len(), 1);
    assert_eq!(recorded.uploads[0], ("paper.txt".to_string(), b"some text".to_vec()));
}

#[tokio::test]
async fn test_upload_missing_local_file_is_an_error() {
    let mock = common::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let err = client(&mock.base_url)
        .upload(&dir.path().join("missing.pdf"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to read"));
}

#[tokio::test]
async fn test_download_encodes_path() {
    let mock = common::spawn().await;
    let client = client(&mock.base_url);

    let bytes = client.download("ProjectA/ir.pdf").await.unwrap();
    assert_eq!(bytes, common::PDF_BYTES);

    let bytes = client.download("My Docs/a#1.pdf").await.unwrap();
    assert_eq!(bytes, common::PDF_BYTES);

    let err = client.download("nope.pdf").await.unwrap_err();
    assert!(err.to_string().contains("File not found"));

    assert_eq!(
        mock.recorded().downloads,
        vec!["ProjectA/ir.pdf", "My Docs/a#1.pdf", "nope.pdf"]
    );
}
