// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{ComparisonOutcome, ComparisonReport, FaceComparison, FaceMatchCounts, ImageRef};
pub use requests::{CompareQuery, ComparisonRequest};
pub use responses::{ComparisonResponse, HealthResponse};
