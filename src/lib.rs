use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use controller::PresentationController;
use services::analysis_client::{AnalysisService, HttpAnalysisClient};

// Application state
pub struct AppState {
    pub config: Config,
    pub controller: PresentationController,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let service = Arc::new(HttpAnalysisClient::from_config(&config));
        Self::with_service(config, service)
    }

    pub fn with_service(config: Config, service: Arc<dyn AnalysisService>) -> Self {
        let controller = PresentationController::new(service, config.request_timeout);
        Self { config, controller }
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::routes())
        .merge(routes::session::routes(state.config.max_file_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
