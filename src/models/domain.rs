use std::sync::Arc;

use crate::core::errors::{ComparisonError, RecognitionError};

/// A downloaded and validated image
///
/// Bytes are shared so the image can be handed to concurrent comparison
/// tasks without copying.
#[derive(Debug, Clone)]
pub struct ImageRef {
    pub url: String,
    pub bytes: Arc<[u8]>,
}

impl ImageRef {
    pub fn new(url: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            url: url.into(),
            bytes: bytes.into(),
        }
    }
}

/// Face counts returned by one source/target comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaceMatchCounts {
    /// Faces in the target that matched no face in the source
    pub unmatched: usize,
    /// Faces in the target that matched a face in the source
    pub matched: usize,
}

impl FaceMatchCounts {
    pub fn new(unmatched: usize, matched: usize) -> Self {
        Self { unmatched, matched }
    }
}

/// Result of a comparison call.
///
/// The backend may report counts and an error at the same time; both are
/// kept and both are reported.
#[derive(Debug, Default)]
pub struct FaceComparison {
    pub counts: FaceMatchCounts,
    pub error: Option<RecognitionError>,
}

impl FaceComparison {
    pub fn ok(counts: FaceMatchCounts) -> Self {
        Self { counts, error: None }
    }

    pub fn failed(counts: FaceMatchCounts, error: RecognitionError) -> Self {
        Self {
            counts,
            error: Some(error),
        }
    }
}

/// Classification of a single target against the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOutcome {
    Matched,
    Unmatched,
    MultipleFaces,
    FacesNotFound,
}

impl ComparisonOutcome {
    /// Whether the outcome lands in one of the report buckets
    pub fn is_reported(self) -> bool {
        !matches!(self, ComparisonOutcome::Matched)
    }
}

/// Aggregated result of comparing a batch of images against its source
#[derive(Debug, Default)]
pub struct ComparisonReport {
    pub source_url: String,
    pub unmatched: Vec<String>,
    pub multiple_faces: Vec<String>,
    pub faces_not_found: Vec<String>,
    pub gender: String,
    pub errors: Vec<ComparisonError>,
}

impl ComparisonReport {
    /// Report with empty buckets and the given errors
    pub fn rejected(errors: Vec<ComparisonError>) -> Self {
        Self {
            errors,
            ..Self::default()
        }
    }

    /// Put `url` into the bucket matching `outcome`
    pub fn record(&mut self, url: String, outcome: ComparisonOutcome) {
        match outcome {
            ComparisonOutcome::Unmatched => self.unmatched.push(url),
            ComparisonOutcome::MultipleFaces => self.multiple_faces.push(url),
            ComparisonOutcome::FacesNotFound => self.faces_not_found.push(url),
            ComparisonOutcome::Matched => {}
        }
    }

    /// Number of URLs across all buckets
    pub fn reported_count(&self) -> usize {
        self.unmatched.len() + self.multiple_faces.len() + self.faces_not_found.len()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }
}
