//! In-process mock of the document search and chat service.
//!
//! Serves the same routes and JSON shapes as the real service on an
//! ephemeral port and records every request it receives.

#![allow(dead_code)]

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub const PDF_BYTES: &[u8] = b"%PDF-1.4 mock document";

/// Documents known to the mock, in ranking order.
const CORPUS: &[(&str, f64, &str)] = &[
    ("ProjectA/ir.pdf", 0.91, "Introduces <mark>information retrieval</mark>."),
    ("ProjectB/bm25.txt", 0.74, "Okapi <b>BM25</b> ranking."),
    ("notes.txt", 0.32, "Loose notes &amp; links."),
];

#[derive(Debug, Default)]
pub struct Recorded {
    pub searches: Vec<Value>,
    pub chats: Vec<Value>,
    pub file_listings: usize,
    pub reloads: usize,
    pub uploads: Vec<(String, Vec<u8>)>,
    pub downloads: Vec<String>,
}

#[derive(Clone, Default)]
pub struct MockState {
    pub recorded: Arc<Mutex<Recorded>>,
    pub fail_search: Arc<AtomicBool>,
    pub fail_chat: Arc<AtomicBool>,
}

pub struct MockService {
    pub base_url: String,
    pub state: MockState,
}

impl MockService {
    pub fn recorded(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.state.recorded.lock().unwrap()
    }

    pub fn fail_search(&self, fail: bool) {
        self.state.fail_search.store(fail, Ordering::SeqCst);
    }

    pub fn fail_chat(&self, fail: bool) {
        self.state.fail_chat.store(fail, Ordering::SeqCst);
    }
}

/// Start the mock on `127.0.0.1:0`. It runs until the test runtime stops.
pub async fn spawn() -> MockService {
    let state = MockState::default();
    let app = Router::new()
        .route("/search", post(handle_search))
        .route("/get_files", get(handle_get_files))
        .route("/ai-chat", post(handle_chat))
        .route("/reload", post(handle_reload))
        .route("/upload", post(handle_upload))
        .route("/download/{*filename}", get(handle_download))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockService {
        base_url: format!("http://{}", addr),
        state,
    }
}

/// A base URL nothing is listening on.
pub fn closed_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

struct ApiError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

fn api_error(status: StatusCode, message: &str) -> ApiError {
    ApiError {
        status,
        message: message.to_string(),
    }
}

fn in_scope(filename: &str, filters: &[String]) -> bool {
    filters.is_empty()
        || filters
            .iter()
            .any(|f| filename == f.as_str() || filename.starts_with(&format!("{}/", f)))
}

async fn handle_search(
    State(state): State<MockState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    state.recorded.lock().unwrap().searches.push(body.clone());
    if state.fail_search.load(Ordering::SeqCst) {
        return Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, "Search failed"));
    }

    let filters: Vec<String> = serde_json::from_value(body["filter_files"].clone()).unwrap_or_default();
    let method = body["search_type"].as_str().unwrap_or("hybrid").to_string();
    let results: Vec<Value> = CORPUS
        .iter()
        .filter(|(name, _, _)| in_scope(name, &filters))
        .map(|(name, score, summary)| {
            let file_type = if name.ends_with(".pdf") { "PDF" } else { "TXT" };
            let mut hit = json!({
                "filename": name,
                "score": score,
                "summary": summary,
                "key_points": ["First <b>point</b>", "Second point"],
                "file_type": file_type,
                "file_size": "12 KB",
                "modified_date": "2024-03-01",
                "method": method,
            });
            if method == "hybrid" {
                hit["tfidf_score"] = json!(0.5);
                hit["bm25_score"] = json!(0.6);
                hit["semantic_score"] = json!(0.7);
            }
            if name.ends_with(".pdf") {
                hit["images"] = json!([{ "data": "data:image/png;base64,aGVsbG8=", "page": 1 }]);
            }
            hit
        })
        .collect();

    Ok(Json(json!({ "results": results })))
}

async fn handle_get_files(State(state): State<MockState>) -> Json<Value> {
    state.recorded.lock().unwrap().file_listings += 1;
    Json(json!({
        "folders": ["ProjectA", "ProjectB"],
        "files": CORPUS.iter().map(|(name, _, _)| *name).collect::<Vec<_>>(),
    }))
}

async fn handle_chat(
    State(state): State<MockState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    state.recorded.lock().unwrap().chats.push(body.clone());
    if state.fail_chat.load(Ordering::SeqCst) {
        return Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "AI service unavailable",
        ));
    }

    let query = body["query"].as_str().unwrap_or_default();
    // Cite every hit, the first one twice.
    let mut sources: Vec<Value> = body["search_results"]
        .as_array()
        .map(|hits| hits.iter().map(|h| h["filename"].clone()).collect())
        .unwrap_or_default();
    if let Some(first) = sources.first().cloned() {
        sources.push(first);
    }

    let hit_count = body["search_results"].as_array().map_or(0, Vec::len);
    Ok(Json(json!({
        "response": format!("**Answer** to {}\n\n- grounded in {} hits", query, hit_count),
        "sources": sources,
    })))
}

async fn handle_reload(State(state): State<MockState>) -> Json<Value> {
    state.recorded.lock().unwrap().reloads += 1;
    Json(json!({ "message": "Documents reloaded", "doc_count": CORPUS.len() }))
}

async fn handle_upload(
    State(state): State<MockState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, &e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, &e.to_string()))?;
        if name.ends_with(".exe") {
            return Err(api_error(StatusCode::BAD_REQUEST, "File type not allowed"));
        }
        let total = {
            let mut recorded = state.recorded.lock().unwrap();
            recorded.uploads.push((name.clone(), bytes.to_vec()));
            CORPUS.len() + recorded.uploads.len()
        };
        return Ok(Json(json!({
            "message": "File uploaded successfully",
            "filename": name,
            "total_documents": total,
        })));
    }
    Err(api_error(StatusCode::BAD_REQUEST, "No file provided"))
}

async fn handle_download(
    State(state): State<MockState>,
    Path(filename): Path<String>,
) -> Result<Vec<u8>, ApiError> {
    state.recorded.lock().unwrap().downloads.push(filename.clone());
    if filename == "ProjectA/ir.pdf" || filename == "My Docs/a#1.pdf" {
        Ok(PDF_BYTES.to_vec())
    } else {
        Err(api_error(StatusCode::NOT_FOUND, "File not found"))
    }
}
