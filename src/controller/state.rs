//! Upload lifecycle and view selection.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::{Analysis, SelectedFile};
use crate::services::annotation::AnnotatedGrid;

pub type RequestId = u64;

/// Exactly one of these is active at a time. Terminal states keep the file
/// so a retry has something to resubmit.
#[derive(Debug, Clone, Default)]
pub enum UploadState {
    #[default]
    Idle,
    FileSelected {
        file: SelectedFile,
    },
    Uploading {
        file: SelectedFile,
        request_id: RequestId,
    },
    Succeeded {
        file: SelectedFile,
        analysis: Arc<Analysis>,
        grid: Arc<AnnotatedGrid>,
    },
    Failed {
        file: SelectedFile,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Idle,
    FileSelected,
    Uploading,
    Succeeded,
    Failed,
}

impl UploadState {
    pub fn status(&self) -> UploadStatus {
        match self {
            UploadState::Idle => UploadStatus::Idle,
            UploadState::FileSelected { .. } => UploadStatus::FileSelected,
            UploadState::Uploading { .. } => UploadStatus::Uploading,
            UploadState::Succeeded { .. } => UploadStatus::Succeeded,
            UploadState::Failed { .. } => UploadStatus::Failed,
        }
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        match self {
            UploadState::Idle => None,
            UploadState::FileSelected { file }
            | UploadState::Uploading { file, .. }
            | UploadState::Succeeded { file, .. }
            | UploadState::Failed { file, .. } => Some(file),
        }
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self, UploadState::Uploading { .. })
    }

    pub fn in_flight_request(&self) -> Option<RequestId> {
        match self {
            UploadState::Uploading { request_id, .. } => Some(*request_id),
            _ => None,
        }
    }

    pub fn analysis(&self) -> Option<&Arc<Analysis>> {
        match self {
            UploadState::Succeeded { analysis, .. } => Some(analysis),
            _ => None,
        }
    }

    pub fn grid(&self) -> Option<&Arc<AnnotatedGrid>> {
        match self {
            UploadState::Succeeded { grid, .. } => Some(grid),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            UploadState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveView {
    #[default]
    Summary,
    Grid,
}
