use crate::models::{ComparisonOutcome, FaceMatchCounts};

/// Map the face counts of one comparison to its outcome.
///
/// # Rules
/// - exactly one unmatched face: `Unmatched`
/// - more than one unmatched face: `MultipleFaces`
/// - no faces at all: `FacesNotFound`
/// - only matched faces: `Matched` (not reported)
pub fn classify(counts: FaceMatchCounts) -> ComparisonOutcome {
    match (counts.unmatched, counts.matched) {
        (1, _) => ComparisonOutcome::Unmatched,
        (u, _) if u > 1 => ComparisonOutcome::MultipleFaces,
        (0, 0) => ComparisonOutcome::FacesNotFound,
        _ => ComparisonOutcome::Matched,
    }
}
