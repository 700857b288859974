// Unit tests for Face Comparison

use face_comparison::core::{
    classify::classify,
    errors::{ComparisonError, ErrorKind},
    format::{sniff_mime, validate, SupportedFormat, MIME_JPEG, MIME_PNG},
};
use face_comparison::models::{ComparisonOutcome, ComparisonReport, ComparisonResponse, FaceMatchCounts};

#[test]
fn test_classification_is_exclusive() {
    for unmatched in 0..6 {
        for matched in 0..6 {
            let counts = FaceMatchCounts::new(unmatched, matched);
            let mut report = ComparisonReport::default();
            report.record("http://img/target.jpg".to_string(), classify(counts));

            let expected = match (unmatched, matched) {
                (1, _) => 1,
                (u, _) if u > 1 => 1,
                (0, 0) => 1,
                _ => 0,
            };
            assert_eq!(
                report.reported_count(),
                expected,
                "counts {:?} landed in {} buckets",
                counts,
                report.reported_count()
            );
        }
    }
}

#[test]
fn test_classification_rule_table() {
    assert_eq!(classify(FaceMatchCounts::new(1, 0)), ComparisonOutcome::Unmatched);
    assert_eq!(classify(FaceMatchCounts::new(2, 0)), ComparisonOutcome::MultipleFaces);
    assert_eq!(classify(FaceMatchCounts::new(0, 0)), ComparisonOutcome::FacesNotFound);
    assert_eq!(classify(FaceMatchCounts::new(0, 1)), ComparisonOutcome::Matched);
    assert_eq!(classify(FaceMatchCounts::new(0, 4)), ComparisonOutcome::Matched);
}

#[test]
fn test_validator_allow_list() {
    assert_eq!(validate(b"\x89PNG\r\n\x1a\n\0\0"), Ok(SupportedFormat::Png));
    assert_eq!(validate(b"\xff\xd8\xff\xdb\0\0"), Ok(SupportedFormat::Jpeg));
    assert!(validate(b"RIFF\0\0\0\0WEBPVP8 ").is_err());
    assert!(validate(b"BM\0\0\0\0\0\0\0\0").is_err());
    assert!(validate(b"plain text").is_err());
}

#[test]
fn test_sniffed_mime_types() {
    assert_eq!(sniff_mime(b"\x89PNG\r\n\x1a\n\0\0"), Some(MIME_PNG));
    assert_eq!(sniff_mime(b"\xff\xd8\xff\xe1\0\0"), Some(MIME_JPEG));
    assert_eq!(sniff_mime(b"???"), None);
}

#[test]
fn test_download_error_messages() {
    let err = ComparisonError::ServerNotExists {
        url: "http://nowhere.invalid/a.jpg".to_string(),
        reason: "dns error".to_string(),
    };
    assert_eq!(err.kind(), ErrorKind::ServerNotExists);
    assert!(err.to_string().starts_with("remote server doesn't exist"));

    let err = ComparisonError::FileNotSupported {
        url: "http://img/a.heic".to_string(),
    };
    assert_eq!(err.to_string(), "unsupported file type: http://img/a.heic");
}

#[test]
fn test_response_from_report() {
    let mut report = ComparisonReport {
        source_url: "http://img/me.jpg".to_string(),
        gender: "female".to_string(),
        ..ComparisonReport::default()
    };
    report.record("http://img/other.jpg".to_string(), ComparisonOutcome::Unmatched);
    report.errors.push(ComparisonError::FileNotSupported {
        url: "http://img/x.gif".to_string(),
    });

    let response = ComparisonResponse::from(report);

    assert_eq!(response.target, "http://img/me.jpg");
    assert_eq!(response.unmatched, vec!["http://img/other.jpg"]);
    assert!(response.multiple_faces.is_empty());
    assert!(response.faces_not_found.is_empty());
    assert_eq!(response.gender, "female");
    assert_eq!(response.errors, vec!["unsupported file type: http://img/x.gif"]);
}
