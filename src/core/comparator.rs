use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;

use crate::core::classify::classify;
use crate::core::downloader::BatchDownloader;
use crate::core::errors::{ComparisonError, RecognitionError};
use crate::core::logger::Logger;
use crate::models::{ComparisonOutcome, ComparisonReport, FaceComparison, ImageRef};

/// Minimum number of images a comparison needs: one source, one target
pub const MIN_IMAGES: usize = 2;

/// Face recognition backend
///
/// Both calls are remote, may be slow and may fail; they are never retried.
#[async_trait]
pub trait RecognitionClient: Send + Sync {
    /// Compare the faces of `target` against those of `source`.
    ///
    /// Counts are meaningful even when an error is also reported.
    async fn compare_faces(&self, source: &[u8], target: &[u8]) -> FaceComparison;

    /// Predict the gender of the first face found in `image`
    async fn predict_gender(&self, image: &[u8]) -> Result<String, RecognitionError>;
}

/// Outcome of one fan-out task
struct TargetResult {
    url: String,
    outcome: Option<ComparisonOutcome>,
    error: Option<ComparisonError>,
}

/// Main comparison orchestrator
///
/// # Pipeline Stages
/// 1. Size gate on the requested URLs
/// 2. Concurrent download and format validation
/// 3. Size gate on the surviving images
/// 4. Concurrent source/target comparisons
/// 5. Gender prediction for the source
///
/// Only the two size gates end a request early. Every other failure is
/// recorded in the report and processing carries on.
#[derive(Clone)]
pub struct Comparator {
    downloader: BatchDownloader,
    recognition: Arc<dyn RecognitionClient>,
    logger: Arc<dyn Logger>,
}

impl Comparator {
    pub fn new(
        downloader: BatchDownloader,
        recognition: Arc<dyn RecognitionClient>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            downloader,
            recognition,
            logger,
        }
    }

    /// Compare every image in `urls` against the first usable one
    ///
    /// The source is the first URL, in request order, that downloads and
    /// validates successfully. Buckets and errors follow request order.
    pub async fn compare_images(&self, urls: &[String]) -> ComparisonReport {
        self.logger
            .debug(&format!("validating request with {} urls", urls.len()));

        if urls.len() < MIN_IMAGES {
            return ComparisonReport::rejected(vec![ComparisonError::NotEnoughImages {
                filtered: false,
            }]);
        }

        self.logger.debug("downloading images");
        let (images, mut errors) = self.downloader.fetch_all(urls).await;

        if images.len() < MIN_IMAGES {
            self.logger.info(&format!(
                "only {} of {} images usable, skipping comparison",
                images.len(),
                urls.len()
            ));
            errors.push(ComparisonError::NotEnoughImages { filtered: true });
            return ComparisonReport::rejected(errors);
        }

        let mut images = images.into_iter();
        let source = match images.next() {
            Some(source) => source,
            None => return ComparisonReport::rejected(errors),
        };
        let targets: Vec<ImageRef> = images.collect();
        let target_count = targets.len();

        self.logger.debug(&format!(
            "comparing {} targets against {}",
            target_count, source.url
        ));

        let mut report = ComparisonReport {
            source_url: source.url.clone(),
            errors,
            ..ComparisonReport::default()
        };

        for result in self.compare_targets(&source, targets).await {
            if let Some(outcome) = result.outcome {
                if outcome.is_reported() {
                    self.logger
                        .debug(&format!("{} classified as {:?}", result.url, outcome));
                }
                report.record(result.url, outcome);
            }
            if let Some(err) = result.error {
                self.logger.warn(&err.to_string());
                report.errors.push(err);
            }
        }

        self.logger.debug("predicting gender");
        match self.recognition.predict_gender(&source.bytes).await {
            Ok(gender) => report.gender = gender,
            Err(err) => report.errors.push(ComparisonError::GenderPredictionFailed {
                source_url: source.url.clone(),
                source: err,
            }),
        }

        self.logger.info(&format!(
            "compared {} against {} targets: {} unmatched, {} multiple faces, {} without faces, {} errors",
            report.source_url,
            target_count,
            report.unmatched.len(),
            report.multiple_faces.len(),
            report.faces_not_found.len(),
            report.errors.len()
        ));

        report
    }

    /// Fan out one task per target and wait for all of them
    async fn compare_targets(&self, source: &ImageRef, targets: Vec<ImageRef>) -> Vec<TargetResult> {
        let handles: Vec<_> = targets
            .into_iter()
            .map(|target| {
                let recognition = Arc::clone(&self.recognition);
                let source = source.clone();
                let url = target.url.clone();
                let handle = tokio::spawn(async move {
                    let comparison = recognition
                        .compare_faces(&source.bytes, &target.bytes)
                        .await;
                    let outcome = classify(comparison.counts);
                    let error = comparison.error.map(|err| ComparisonError::ComparisonFailed {
                        source_url: source.url.clone(),
                        target_url: target.url.clone(),
                        source: err,
                    });
                    TargetResult {
                        url: target.url,
                        outcome: Some(outcome),
                        error,
                    }
                });
                (url, handle)
            })
            .collect();

        let (urls, handles): (Vec<_>, Vec<_>) = handles.into_iter().unzip();

        join_all(handles)
            .await
            .into_iter()
            .zip(urls)
            .map(|(joined, url)| match joined {
                Ok(result) => result,
                Err(join_err) => TargetResult {
                    error: Some(ComparisonError::ComparisonFailed {
                        source_url: source.url.clone(),
                        target_url: url.clone(),
                        source: RecognitionError::InvalidResponse(format!(
                            "comparison task failed: {}",
                            join_err
                        )),
                    }),
                    url,
                    outcome: None,
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::downloader::ImageFetcher;
    use crate::core::errors::{BackendErrorCode, ErrorKind};
    use crate::core::logger::{MemoryLogger, NullLogger};
    use crate::models::FaceMatchCounts;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    struct PngFetcher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ImageFetcher for PngFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, ComparisonError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if url.ends_with(".heic") {
                return Ok(b"\0\0\0\x18ftypheic".to_vec());
            }
            // Append the URL so the gateway can tell images apart
            let mut body = PNG.to_vec();
            body.extend_from_slice(url.as_bytes());
            Ok(body)
        }
    }

    /// Answers by looking for a marker in the target's URL
    struct MarkerRecognition;

    #[async_trait]
    impl RecognitionClient for MarkerRecognition {
        async fn compare_faces(&self, _source: &[u8], target: &[u8]) -> FaceComparison {
            let text = String::from_utf8_lossy(target);
            if text.contains("stranger") {
                FaceComparison::ok(FaceMatchCounts::new(1, 0))
            } else if text.contains("crowd") {
                FaceComparison::ok(FaceMatchCounts::new(2, 0))
            } else if text.contains("landscape") {
                FaceComparison::ok(FaceMatchCounts::new(0, 0))
            } else if text.contains("broken") {
                FaceComparison::failed(
                    FaceMatchCounts::new(1, 0),
                    RecognitionError::Backend {
                        code: BackendErrorCode::InternalServerError,
                        message: "boom".to_string(),
                    },
                )
            } else {
                FaceComparison::ok(FaceMatchCounts::new(0, 1))
            }
        }

        async fn predict_gender(&self, image: &[u8]) -> Result<String, RecognitionError> {
            if String::from_utf8_lossy(image).contains("faceless") {
                Err(RecognitionError::NoFaceDetails)
            } else {
                Ok("female".to_string())
            }
        }
    }

    fn comparator() -> (Comparator, Arc<PngFetcher>) {
        let fetcher = Arc::new(PngFetcher {
            calls: AtomicUsize::new(0),
        });
        let logger: Arc<dyn Logger> = Arc::new(NullLogger);
        let downloader = BatchDownloader::new(fetcher.clone(), logger.clone());
        (
            Comparator::new(downloader, Arc::new(MarkerRecognition), logger),
            fetcher,
        )
    }

    fn urls(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| format!("http://img/{}", n)).collect()
    }

    #[tokio::test]
    async fn test_single_url_makes_no_calls() {
        let (comparator, fetcher) = comparator();

        let report = comparator.compare_images(&urls(&["me.png"])).await;

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind(), ErrorKind::NotEnoughImages);
        assert_eq!(report.reported_count(), 0);
    }

    #[tokio::test]
    async fn test_buckets_are_filled() {
        let (comparator, _) = comparator();

        let report = comparator
            .compare_images(&urls(&["me.png", "stranger.png", "crowd.png", "landscape.png", "me2.png"]))
            .await;

        assert_eq!(report.source_url, "http://img/me.png");
        assert_eq!(report.unmatched, vec!["http://img/stranger.png"]);
        assert_eq!(report.multiple_faces, vec!["http://img/crowd.png"]);
        assert_eq!(report.faces_not_found, vec!["http://img/landscape.png"]);
        assert_eq!(report.gender, "female");
        assert!(report.errors.is_empty());
    }

    #[tokio::test]
    async fn test_error_and_bucket_are_both_recorded() {
        let (comparator, _) = comparator();

        let report = comparator.compare_images(&urls(&["me.png", "broken.png"])).await;

        assert_eq!(report.unmatched, vec!["http://img/broken.png"]);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind(), ErrorKind::ComparisonFailed);
        assert_eq!(
            report.errors[0].to_string(),
            "unable to compare images http://img/me.png and http://img/broken.png: InternalServerError: boom"
        );
    }

    #[tokio::test]
    async fn test_filtered_inputs_hit_second_gate() {
        let (comparator, fetcher) = comparator();

        let report = comparator.compare_images(&urls(&["me.png", "photo.heic"])).await;

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
        assert!(report.source_url.is_empty());
        let kinds: Vec<_> = report.errors.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec![ErrorKind::FileNotSupported, ErrorKind::NotEnoughImages]);
    }

    #[tokio::test]
    async fn test_gender_failure_is_recorded() {
        let (comparator, _) = comparator();

        let report = comparator.compare_images(&urls(&["faceless.png", "me.png"])).await;

        assert!(report.gender.is_empty());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind(), ErrorKind::GenderPredictionFailed);
        assert_eq!(report.errors[0].url(), Some("http://img/faceless.png"));
    }

    #[tokio::test]
    async fn test_logs_summary() {
        let fetcher = Arc::new(PngFetcher {
            calls: AtomicUsize::new(0),
        });
        let logger = Arc::new(MemoryLogger::new());
        let downloader = BatchDownloader::new(fetcher, logger.clone());
        let comparator = Comparator::new(downloader, Arc::new(MarkerRecognition), logger.clone());

        comparator.compare_images(&urls(&["me.png", "stranger.png"])).await;

        let lines = logger.lines();
        assert!(lines
            .iter()
            .any(|l| l.starts_with("INFO compared http://img/me.png")));
        assert!(lines.contains(&"DEBUG http://img/stranger.png classified as Unmatched".to_string()));
        assert!(!lines.iter().any(|l| l.contains("me.png classified")));
    }
}
