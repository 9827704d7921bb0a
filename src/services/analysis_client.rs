use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};

use crate::config::Config;
use crate::error::{AppError, UPLOAD_FALLBACK_MESSAGE};
use crate::models::{Analysis, AnalyzeResponse, ErrorBody, SelectedFile};

/// Anything that can turn an uploaded file into an [`Analysis`].
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn analyze(&self, file: &SelectedFile) -> Result<Analysis, AppError>;
}

/// Posts the file as multipart form data to the analysis service.
pub struct HttpAnalysisClient {
    client: Client,
    url: String,
    field: String,
}

impl HttpAnalysisClient {
    pub fn new(url: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            field: field.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.analysis_url.clone(), config.upload_field.clone())
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisClient {
    async fn analyze(&self, file: &SelectedFile) -> Result<Analysis, AppError> {
        let start = std::time::Instant::now();
        tracing::info!("Uploading {} ({}KB) to {}", file.name, file.size() / 1024, self.url);

        let part = Part::stream(file.bytes.clone()).file_name(file.name.clone());
        let form = Form::new().part(self.field.clone(), part);

        let response = self.client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach analysis service: {}", e);
                AppError::TransportFailure(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| {
                tracing::error!("Failed to read analysis response body: {}", e);
                AppError::TransportFailure(e.to_string())
            })?;

        tracing::info!("Analysis service answered {} in {:?}", status, start.elapsed());
        parse_response(status, &body)
    }
}

/// Maps a raw service reply onto an analysis or one of the failure kinds.
pub fn parse_response(status: StatusCode, body: &[u8]) -> Result<Analysis, AppError> {
    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.trim().is_empty());
        tracing::warn!("Analysis service rejected the upload with {}: {:?}", status, message);
        return Err(AppError::ServiceError(
            message.unwrap_or_else(|| UPLOAD_FALLBACK_MESSAGE.to_string()),
        ));
    }

    let envelope: AnalyzeResponse = serde_json::from_slice(body).map_err(|e| {
        tracing::error!("Failed to decode analysis payload: {}", e);
        AppError::MalformedPayload(e.to_string())
    })?;

    match envelope.analysis {
        Some(analysis) => {
            if let Some(message) = &envelope.message {
                tracing::debug!("Analysis service says: {}", message);
            }
            for issue in analysis.consistency_issues() {
                tracing::warn!("Inconsistent analysis payload: {}", issue);
            }
            tracing::info!(
                "Received analysis with {} rows and {} columns",
                analysis.total_rows,
                analysis.columns.len()
            );
            Ok(analysis)
        }
        None => match envelope.error {
            Some(message) => Err(AppError::ServiceError(message)),
            None => Err(AppError::MalformedPayload(
                "response has no analysis field".to_string(),
            )),
        },
    }
}
