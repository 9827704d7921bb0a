#![allow(dead_code)]

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    routing::post,
    Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub field: String,
    pub file_name: Option<String>,
    pub size: usize,
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    body: String,
    uploads: Arc<Mutex<Vec<RecordedUpload>>>,
}

pub struct MockAnalysisService {
    pub url: String,
    pub uploads: Arc<Mutex<Vec<RecordedUpload>>>,
}

pub async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// Serves `/api/upload`, recording every multipart field and answering with a canned reply.
pub async fn mock_analysis_service(status: StatusCode, body: impl Into<String>) -> MockAnalysisService {
    let uploads = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        status,
        body: body.into(),
        uploads: uploads.clone(),
    };
    let router = Router::new()
        .route("/api/upload", post(upload))
        .with_state(state);
    let addr = serve(router).await;

    MockAnalysisService {
        url: format!("http://{}/api/upload", addr),
        uploads,
    }
}

async fn upload(
    State(state): State<MockState>,
    mut multipart: Multipart,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let size = field.bytes().await.map(|b| b.len()).unwrap_or(0);
        state.uploads.lock().push(RecordedUpload {
            field: name,
            file_name,
            size,
        });
    }
    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body.clone(),
    )
}

/// The `age` dataset: present, missing and placeholder rows.
pub fn age_analysis_json() -> Value {
    json!({
        "columns": ["age"],
        "data": [{"age": 30}, {"age": null}, {"age": "TBD"}],
        "total_rows": 3,
        "total_columns": 1,
        "missing_positions": {"age": [1]},
        "tbd_positions": {"age": [2]},
        "missing_values": {"age": 1},
        "tbd_values": {"age": 1},
        "missing_percentage": {"age": 33.333333333333336},
        "tbd_percentage": {"age": 33.333333333333336},
        "data_types": {"age": "object"}
    })
}

pub fn success_body(analysis: Value) -> String {
    json!({
        "message": "File uploaded successfully",
        "analysis": analysis
    })
    .to_string()
}
