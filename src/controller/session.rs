//! The single writer of the upload session.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::pagination::{Pagination, PAGE_SIZE_OPTIONS};
use super::state::{ActiveView, RequestId, UploadState, UploadStatus};
use crate::error::{AppError, NO_FILE_SELECTED_MESSAGE};
use crate::models::SelectedFile;
use crate::services::analysis_client::AnalysisService;
use crate::services::annotation::{annotate_shared, RenderedRow};
use crate::services::summary::{build_summary, SummaryReport};

#[derive(Debug, Default)]
struct Session {
    state: UploadState,
    view: ActiveView,
    pagination: Pagination,
    notice: Option<String>,
    last_request_id: RequestId,
}

/// How a finished analyze call was applied to the session.
#[derive(Debug)]
pub enum AnalyzeOutcome {
    Succeeded,
    Failed(AppError),
    /// A newer selection or request superseded this one.
    Discarded,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub status: UploadStatus,
    pub file_name: Option<String>,
    pub file_size: Option<usize>,
    pub request_id: Option<RequestId>,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub can_analyze: bool,
    pub view: ActiveView,
    pub pagination: Pagination,
    pub total_rows: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridPage {
    pub columns: Vec<String>,
    pub rows: Vec<RenderedRow>,
    pub page: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub total_rows: usize,
    pub page_size_options: [usize; 4],
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewContent {
    Summary(SummaryReport),
    Grid(GridPage),
}

pub struct PresentationController {
    service: Arc<dyn AnalysisService>,
    timeout: Option<Duration>,
    session: Mutex<Session>,
}

impl PresentationController {
    pub fn new(service: Arc<dyn AnalysisService>, timeout: Option<Duration>) -> Self {
        Self {
            service,
            timeout,
            session: Mutex::new(Session::default()),
        }
    }

    /// Replaces whatever was selected or analysed before. An in-flight
    /// request keeps running but its response will be dropped.
    pub fn select_file(&self, file: SelectedFile) {
        let mut session = self.session.lock();
        if let Some(request_id) = session.state.in_flight_request() {
            tracing::info!(
                "File {} selected while request {} is in flight; its response will be discarded",
                file.name,
                request_id
            );
        } else {
            tracing::info!("Selected file {} ({} bytes)", file.name, file.size());
        }
        session.state = UploadState::FileSelected { file };
        session.notice = None;
        session.pagination.first();
    }

    pub async fn analyze(&self) -> Result<AnalyzeOutcome, AppError> {
        // 1. Claim the session for a new request
        let (file, request_id) = {
            let mut guard = self.session.lock();
            let session = &mut *guard;
            let file = match &session.state {
                UploadState::Idle => {
                    tracing::warn!("Analyze requested without a selected file");
                    session.notice = Some(NO_FILE_SELECTED_MESSAGE.to_string());
                    return Err(AppError::NoFileSelected);
                }
                UploadState::Uploading { request_id, .. } => {
                    tracing::warn!("Analyze requested while request {} is in flight", request_id);
                    return Err(AppError::RequestInFlight);
                }
                UploadState::FileSelected { file }
                | UploadState::Succeeded { file, .. }
                | UploadState::Failed { file, .. } => file.clone(),
            };

            session.last_request_id += 1;
            let request_id = session.last_request_id;
            session.state = UploadState::Uploading {
                file: file.clone(),
                request_id,
            };
            session.notice = None;
            (file, request_id)
        };

        // 2. Call the service without holding the lock
        tracing::info!("Starting analysis request {} for {}", request_id, file.name);
        let start = std::time::Instant::now();
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.service.analyze(&file))
                .await
                .unwrap_or_else(|_| Err(AppError::Timeout(limit))),
            None => self.service.analyze(&file).await,
        };
        let derived = result.map(|analysis| {
            let grid = annotate_shared(&analysis);
            (Arc::new(analysis), grid)
        });

        // 3. Apply only if this request still owns the session
        let mut session = self.session.lock();
        if session.state.in_flight_request() != Some(request_id) {
            tracing::info!(
                "Discarding stale response for request {} after {:?}",
                request_id,
                start.elapsed()
            );
            return Ok(AnalyzeOutcome::Discarded);
        }

        match derived {
            Ok((analysis, grid)) => {
                tracing::info!(
                    "Request {} succeeded in {:?}: {} rows, {} columns",
                    request_id,
                    start.elapsed(),
                    analysis.total_rows,
                    analysis.columns.len()
                );
                session.state = UploadState::Succeeded {
                    file,
                    analysis,
                    grid,
                };
                session.pagination.first();
                Ok(AnalyzeOutcome::Succeeded)
            }
            Err(err) => {
                tracing::error!(
                    "Request {} failed after {:?}: {}",
                    request_id,
                    start.elapsed(),
                    err.detail()
                );
                session.state = UploadState::Failed {
                    file,
                    message: err.to_string(),
                };
                Ok(AnalyzeOutcome::Failed(err))
            }
        }
    }

    pub fn reset(&self) {
        let mut session = self.session.lock();
        let last_request_id = session.last_request_id;
        *session = Session {
            last_request_id,
            ..Session::default()
        };
        tracing::info!("Session reset");
    }

    pub fn state(&self) -> UploadState {
        self.session.lock().state.clone()
    }

    pub fn view(&self) -> ActiveView {
        self.session.lock().view
    }

    pub fn set_view(&self, view: ActiveView) {
        self.session.lock().view = view;
    }

    pub fn pagination(&self) -> Pagination {
        self.session.lock().pagination
    }

    pub fn set_page_size(&self, page_size: usize) -> Result<(), AppError> {
        self.session.lock().pagination.set_page_size(page_size)
    }

    pub fn next_page(&self) -> bool {
        let mut guard = self.session.lock();
        let session = &mut *guard;
        let total = session.state.grid().map_or(0, |g| g.row_count());
        session.pagination.next(total)
    }

    pub fn previous_page(&self) -> bool {
        self.session.lock().pagination.previous()
    }

    pub fn go_to_page(&self, page: usize) -> bool {
        let mut guard = self.session.lock();
        let session = &mut *guard;
        let total = session.state.grid().map_or(0, |g| g.row_count());
        session.pagination.go_to(page, total)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let session = self.session.lock();
        let file = session.state.file();
        SessionSnapshot {
            status: session.state.status(),
            file_name: file.map(|f| f.name.clone()),
            file_size: file.map(|f| f.size()),
            request_id: session.state.in_flight_request(),
            error: session.state.error().map(str::to_string),
            notice: session.notice.clone(),
            can_analyze: file.is_some() && !session.state.is_uploading(),
            view: session.view,
            pagination: session.pagination,
            total_rows: session.state.analysis().map(|a| a.total_rows),
        }
    }

    /// Empty report until an analysis has succeeded.
    pub fn summary(&self) -> SummaryReport {
        let analysis = self.session.lock().state.analysis().cloned();
        analysis
            .map(|a| build_summary(&a))
            .unwrap_or_default()
    }

    /// Current grid page; empty until an analysis has succeeded.
    pub fn grid_page(&self) -> GridPage {
        let (grid, pagination) = {
            let session = self.session.lock();
            (session.state.grid().cloned(), session.pagination)
        };

        let (columns, rows, total_rows) = match grid {
            Some(grid) => {
                let total = grid.row_count();
                let (start, end) = pagination.range(total);
                (grid.column_names(), grid.render_range(start, end), total)
            }
            None => (Vec::new(), Vec::new(), 0),
        };

        GridPage {
            columns,
            rows,
            page: pagination.page(),
            page_size: pagination.page_size(),
            page_count: pagination.page_count(total_rows),
            total_rows,
            page_size_options: PAGE_SIZE_OPTIONS,
        }
    }

    pub fn render(&self) -> ViewContent {
        match self.view() {
            ActiveView::Summary => ViewContent::Summary(self.summary()),
            ActiveView::Grid => ViewContent::Grid(self.grid_page()),
        }
    }
}
