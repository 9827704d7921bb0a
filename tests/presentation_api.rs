mod common;

use axum::http::StatusCode;
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use sheet_quality::{app, config::Config, AppState};
use std::sync::Arc;

struct Api {
    base: String,
    client: reqwest::Client,
}

impl Api {
    async fn start(analysis_url: String) -> Self {
        Self::with_config(Config {
            analysis_url,
            ..Config::default()
        })
        .await
    }

    async fn with_config(config: Config) -> Self {
        let addr = common::serve(app(Arc::new(AppState::new(config)))).await;
        Self {
            base: format!("http://{}", addr),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let response = self.client.get(self.url(path)).send().await.unwrap();
        (response.status().as_u16(), response.json().await.unwrap())
    }

    async fn post(&self, path: &str) -> (u16, Value) {
        let response = self.client.post(self.url(path)).send().await.unwrap();
        (response.status().as_u16(), response.json().await.unwrap())
    }

    async fn put(&self, path: &str, body: Value) -> (u16, Value) {
        let response = self.client.put(self.url(path)).json(&body).send().await.unwrap();
        (response.status().as_u16(), response.json().await.unwrap())
    }

    async fn upload(&self, file_name: &str) -> (u16, Value) {
        self.upload_bytes(file_name, b"age\n30\n\nTBD\n".to_vec()).await
    }

    async fn upload_bytes(&self, file_name: &str, bytes: Vec<u8>) -> (u16, Value) {
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part("file", part);
        let response = self
            .client
            .post(self.url("/session/file"))
            .multipart(form)
            .send()
            .await
            .unwrap();
        (response.status().as_u16(), response.json().await.unwrap())
    }
}

#[tokio::test]
async fn health_check_responds() {
    let api = Api::start("http://127.0.0.1:9/unused".to_string()).await;
    let body = reqwest::get(api.url("/health")).await.unwrap().text().await.unwrap();
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn full_session_walkthrough() {
    let mock = common::mock_analysis_service(
        StatusCode::OK,
        common::success_body(common::age_analysis_json()),
    )
    .await;
    let api = Api::start(mock.url.clone()).await;

    // Nothing selected yet
    let (status, body) = api.post("/session/analyze").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Please select a file first");
    let (_, session) = api.get("/session").await;
    assert_eq!(session["status"], "idle");
    assert_eq!(session["notice"], "Please select a file first");

    // Grid before any analysis is empty, not an error
    api.put("/session/view", json!({"view": "grid"})).await;
    let (status, view) = api.get("/session/view").await;
    assert_eq!(status, 200);
    assert_eq!(view["view"], "grid");
    assert_eq!(view["rows"], json!([]));

    // Extension filter
    let (status, body) = api.upload("notes.txt").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "File type not allowed: notes.txt");

    let (status, session) = api.upload("people.csv").await;
    assert_eq!(status, 200);
    assert_eq!(session["status"], "file_selected");
    assert_eq!(session["file_name"], "people.csv");
    assert_eq!(session["notice"], Value::Null);

    let (status, session) = api.post("/session/analyze").await;
    assert_eq!(status, 200);
    assert_eq!(session["status"], "succeeded");
    assert_eq!(session["total_rows"], 3);

    let (_, grid) = api.get("/session/view").await;
    assert_eq!(grid["columns"], json!(["age"]));
    assert_eq!(grid["rows"][0]["id"], 1);
    assert_eq!(grid["rows"][0]["cells"][0]["display"], "30");
    assert_eq!(grid["rows"][1]["cells"][0]["quality"], "missing");
    assert_eq!(grid["rows"][1]["cells"][0]["display"], "—");
    assert_eq!(grid["rows"][2]["cells"][0]["quality"], "placeholder");
    assert_eq!(grid["rows"][2]["cells"][0]["style"]["color"], "orange");

    api.put("/session/view", json!({"view": "summary"})).await;
    let (_, summary) = api.get("/session/view").await;
    assert_eq!(summary["view"], "summary");
    assert_eq!(summary["total_rows"], 3);
    assert_eq!(summary["columns"][0]["missing"], 1);
    assert_eq!(summary["columns"][0]["missing_label"], "33.3%");

    // Paging
    let (status, _) = api.put("/session/grid/page_size", json!({"page_size": 7})).await;
    assert_eq!(status, 400);
    let (status, grid) = api.put("/session/grid/page_size", json!({"page_size": 25})).await;
    assert_eq!(status, 200);
    assert_eq!(grid["page_size"], 25);
    assert_eq!(grid["page"], 0);
    let (_, grid) = api.post("/session/grid/next").await;
    assert_eq!(grid["page"], 0);
    let (_, grid) = api.put("/session/grid/page", json!({"page": 3})).await;
    assert_eq!(grid["page"], 0);

    let uploads = mock.uploads.lock().clone();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].field, "file");

    let response = api.client.delete(api.url("/session")).send().await.unwrap();
    let session: Value = response.json().await.unwrap();
    assert_eq!(session["status"], "idle");
    assert_eq!(session["view"], "summary");
}

#[tokio::test]
async fn service_failure_is_reported_in_session() {
    let mock = common::mock_analysis_service(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"error":"file too large"}"#,
    )
    .await;
    let api = Api::start(mock.url.clone()).await;

    api.upload("big.xlsx").await;
    let (status, session) = api.post("/session/analyze").await;

    assert_eq!(status, 200);
    assert_eq!(session["status"], "failed");
    assert_eq!(session["error"], "file too large");
    assert_eq!(session["can_analyze"], true);

    let (_, summary) = api.get("/session/summary").await;
    assert_eq!(summary["total_rows"], 0);
    assert_eq!(summary["columns"], json!([]));
}

#[tokio::test]
async fn oversized_uploads_are_rejected_as_too_large() {
    let api = Api::with_config(Config {
        analysis_url: "http://127.0.0.1:9/unused".to_string(),
        max_file_size: 1024,
        ..Config::default()
    })
    .await;

    // Within the framing allowance: the handler measures the file itself.
    let (status, body) = api.upload_bytes("wide.csv", vec![b'x'; 2048]).await;
    assert_eq!(status, 413);
    assert_eq!(body["error"], "File is 2048 bytes, the limit is 1024 bytes");

    // Far past it: the body limit cuts the stream off mid-file.
    let (status, body) = api.upload_bytes("huge.csv", vec![b'x'; 200 * 1024]).await;
    assert_eq!(status, 413);
    assert!(body["error"].as_str().unwrap().starts_with("File is "));
    assert!(body["error"].as_str().unwrap().ends_with("the limit is 1024 bytes"));

    let (_, session) = api.get("/session").await;
    assert_eq!(session["status"], "idle");
}
