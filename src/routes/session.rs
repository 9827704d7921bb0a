use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    routing::{get, post, put},
    Router,
    Json,
    http::{header, HeaderMap, Method, StatusCode},
};
use serde::Deserialize;
use std::sync::Arc;
use crate::{
    AppState,
    config::Config,
    controller::{ActiveView, AnalyzeOutcome, GridPage, SessionSnapshot, ViewContent},
    error::AppError,
    models::SelectedFile,
    services::summary::SummaryReport,
};
use tower_http::cors::{CorsLayer, Any};

/// Multipart field the rendering layer sends the chosen file under.
const FILE_FIELD: &str = "file";
/// Room for multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn routes(max_file_size: usize) -> Router<Arc<AppState>> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/session", get(get_session).delete(reset_session))
        .route("/session/file", post(select_file))
        .route("/session/analyze", post(analyze))
        .route("/session/view", get(get_view).put(set_view))
        .route("/session/summary", get(get_summary))
        .route("/session/grid", get(get_grid))
        .route("/session/grid/page_size", put(set_page_size))
        .route("/session/grid/page", put(go_to_page))
        .route("/session/grid/next", post(next_page))
        .route("/session/grid/previous", post(previous_page))
        .layer(DefaultBodyLimit::max(max_file_size.saturating_add(MULTIPART_OVERHEAD)))
        .layer(cors)
}

#[derive(Debug, Deserialize)]
pub struct ViewRequest {
    view: ActiveView,
}

#[derive(Debug, Deserialize)]
pub struct PageSizeRequest {
    page_size: usize,
}

#[derive(Debug, Deserialize)]
pub struct PageRequest {
    page: usize,
}

async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    Json(state.controller.snapshot())
}

async fn reset_session(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    state.controller.reset();
    Json(state.controller.snapshot())
}

/// A body cut off by the request limit is reported as an oversized file,
/// sized by the declared `Content-Length` when the client sent one.
fn read_error(err: MultipartError, headers: &HeaderMap, limit: usize) -> AppError {
    if err.status() != StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::InvalidInput(format!("Malformed multipart body: {}", err));
    }

    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());
    tracing::warn!("Upload exceeded the body limit (declared {:?} bytes)", declared);
    AppError::FileTooLarge {
        size: declared.unwrap_or_else(|| limit.saturating_add(MULTIPART_OVERHEAD)),
        limit,
    }
}

async fn select_file(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<SessionSnapshot>, AppError> {
    let limit = state.config.max_file_size;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| read_error(e, &headers, limit))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::InvalidInput("No selected file".to_string()))?;

        if !Config::is_allowed_file(&file_name) {
            tracing::warn!("Rejected file with unsupported extension: {}", file_name);
            return Err(AppError::UnsupportedFileType(file_name));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| read_error(e, &headers, limit))?;

        if bytes.len() > limit {
            return Err(AppError::FileTooLarge {
                size: bytes.len(),
                limit,
            });
        }

        state.controller.select_file(SelectedFile::new(file_name, bytes));
        return Ok(Json(state.controller.snapshot()));
    }

    Err(AppError::InvalidInput("No file part".to_string()))
}

async fn analyze(State(state): State<Arc<AppState>>) -> Result<Json<SessionSnapshot>, AppError> {
    match state.controller.analyze().await? {
        AnalyzeOutcome::Succeeded => tracing::debug!("Analysis applied"),
        AnalyzeOutcome::Failed(err) => tracing::debug!("Analysis failed: {}", err),
        AnalyzeOutcome::Discarded => tracing::debug!("Analysis superseded before it finished"),
    }
    Ok(Json(state.controller.snapshot()))
}

async fn get_view(State(state): State<Arc<AppState>>) -> Json<ViewContent> {
    Json(state.controller.render())
}

async fn set_view(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ViewRequest>,
) -> Json<SessionSnapshot> {
    state.controller.set_view(request.view);
    Json(state.controller.snapshot())
}

async fn get_summary(State(state): State<Arc<AppState>>) -> Json<SummaryReport> {
    Json(state.controller.summary())
}

async fn get_grid(State(state): State<Arc<AppState>>) -> Json<GridPage> {
    Json(state.controller.grid_page())
}

async fn set_page_size(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PageSizeRequest>,
) -> Result<Json<GridPage>, AppError> {
    state.controller.set_page_size(request.page_size)?;
    Ok(Json(state.controller.grid_page()))
}

async fn go_to_page(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PageRequest>,
) -> Json<GridPage> {
    state.controller.go_to_page(request.page);
    Json(state.controller.grid_page())
}

async fn next_page(State(state): State<Arc<AppState>>) -> Json<GridPage> {
    state.controller.next_page();
    Json(state.controller.grid_page())
}

async fn previous_page(State(state): State<Arc<AppState>>) -> Json<GridPage> {
    state.controller.previous_page();
    Json(state.controller.grid_page())
}
