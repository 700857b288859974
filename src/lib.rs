//! Face Comparison - compares batches of remote images against a source face
//!
//! This library provides the concurrent download, comparison and
//! classification engine behind the face comparison service.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{classify::classify, BatchDownloader, Comparator, ComparisonError, RecognitionClient};
pub use crate::models::{ComparisonOutcome, ComparisonReport, ComparisonResponse, FaceMatchCounts, ImageRef};
