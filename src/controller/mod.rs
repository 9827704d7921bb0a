//! Presentation controller: upload lifecycle, active view and grid paging.

pub mod pagination;
pub mod session;
pub mod state;

pub use pagination::{Pagination, DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS};
pub use session::{AnalyzeOutcome, GridPage, PresentationController, SessionSnapshot, ViewContent};
pub use state::{ActiveView, RequestId, UploadState, UploadStatus};
