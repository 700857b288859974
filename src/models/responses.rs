use serde::{Deserialize, Serialize};

use crate::models::domain::ComparisonReport;

/// Response for the compare endpoint
///
/// Every array is always present, empty when there is nothing to report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResponse {
    pub target: String,
    pub unmatched: Vec<String>,
    pub multiple_faces: Vec<String>,
    pub faces_not_found: Vec<String>,
    pub gender: String,
    pub errors: Vec<String>,
}

impl ComparisonResponse {
    /// Response carrying a single error and nothing else
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
            ..Self::default()
        }
    }
}

impl From<ComparisonReport> for ComparisonResponse {
    fn from(report: ComparisonReport) -> Self {
        let errors = report.error_messages();
        Self {
            target: report.source_url,
            unmatched: report.unmatched,
            multiple_faces: report.multiple_faces,
            faces_not_found: report.faces_not_found,
            gender: report.gender,
            errors,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
