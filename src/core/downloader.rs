use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;

use crate::core::errors::ComparisonError;
use crate::core::format;
use crate::core::logger::Logger;
use crate::models::ImageRef;

/// Retrieves the raw bytes behind a URL
///
/// Failures are reported already classified, with the URL attached.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ComparisonError>;
}

/// Downloads and validates a list of images concurrently
///
/// Each URL gets its own task. All tasks are awaited before anything is
/// returned, and results are merged in input order, so the first surviving
/// URL of the request is always the first image.
#[derive(Clone)]
pub struct BatchDownloader {
    fetcher: Arc<dyn ImageFetcher>,
    logger: Arc<dyn Logger>,
}

impl BatchDownloader {
    pub fn new(fetcher: Arc<dyn ImageFetcher>, logger: Arc<dyn Logger>) -> Self {
        Self { fetcher, logger }
    }

    /// Download every URL, returning the usable images and the failures
    ///
    /// Duplicated URLs are downloaded independently. A failure never stops
    /// the rest of the batch.
    pub async fn fetch_all(&self, urls: &[String]) -> (Vec<ImageRef>, Vec<ComparisonError>) {
        let handles: Vec<_> = urls
            .iter()
            .cloned()
            .map(|url| {
                let fetcher = Arc::clone(&self.fetcher);
                let logger = Arc::clone(&self.logger);
                tokio::spawn(async move { download_one(fetcher.as_ref(), logger.as_ref(), url).await })
            })
            .collect();

        let results = join_all(handles).await;

        let mut images = Vec::with_capacity(urls.len());
        let mut errors = Vec::new();

        for (url, joined) in urls.iter().zip(results) {
            match joined {
                Ok(Ok(image)) => images.push(image),
                Ok(Err(err)) => {
                    self.logger.warn(&format!("skipping image: {}", err));
                    errors.push(err);
                }
                Err(join_err) => {
                    self.logger
                        .error(&format!("download task for {} failed: {}", url, join_err));
                    errors.push(ComparisonError::DownloadFailed {
                        url: url.clone(),
                        reason: join_err.to_string(),
                    });
                }
            }
        }

        self.logger.debug(&format!(
            "downloaded {} of {} images",
            images.len(),
            urls.len()
        ));

        (images, errors)
    }
}

async fn download_one(
    fetcher: &dyn ImageFetcher,
    logger: &dyn Logger,
    url: String,
) -> Result<ImageRef, ComparisonError> {
    let bytes = fetcher.fetch(&url).await?;

    match format::validate(&bytes) {
        Ok(accepted) => {
            logger.debug(&format!("accepted {} as {}", url, accepted.mime_type()));
            Ok(ImageRef::new(url, bytes))
        }
        Err(rejected) => {
            logger.debug(&format!(
                "rejected {} (detected: {})",
                url,
                rejected.detected.unwrap_or("unknown")
            ));
            Err(ComparisonError::FileNotSupported { url })
        }
    }
}
