pub mod analysis_client;
pub mod annotation;
pub mod summary;

pub use analysis_client::{AnalysisService, HttpAnalysisClient};
pub use annotation::{annotate, AnnotatedGrid, CellQuality};
pub use summary::{build_summary, SummaryReport};
