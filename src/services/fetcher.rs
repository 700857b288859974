use async_trait::async_trait;
use reqwest::{Client, Url};
use std::error::Error as StdError;
use std::time::Duration;

use crate::core::downloader::ImageFetcher;
use crate::core::errors::ComparisonError;

/// Downloads images over HTTP
///
/// No retries. Without a configured timeout the client's defaults apply.
#[derive(Debug, Clone, Default)]
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a fetcher with an optional whole-request timeout
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::new(builder.build()?))
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ComparisonError> {
        let parsed = Url::parse(url).map_err(|e| ComparisonError::RequestConstruction {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let request = self
            .client
            .get(parsed)
            .build()
            .map_err(|e| ComparisonError::RequestConstruction {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| classify_transport_error(url, e))?;

        // Status is not checked: an error page fails format validation anyway
        tracing::debug!("GET {} -> {}", url, response.status());

        let body = response.bytes().await.map_err(|e| ComparisonError::FileRead {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(body.to_vec())
    }
}

/// Map a failed request to the download error taxonomy
pub fn classify_transport_error(url: &str, err: reqwest::Error) -> ComparisonError {
    let reason = error_chain(&err);

    if is_dns_error(&err) {
        ComparisonError::ServerNotExists {
            url: url.to_string(),
            reason,
        }
    } else if err.is_builder() {
        ComparisonError::RequestConstruction {
            url: url.to_string(),
            reason,
        }
    } else {
        ComparisonError::DownloadFailed {
            url: url.to_string(),
            reason,
        }
    }
}

/// Whether host name resolution is what failed
///
/// Resolution failures surface as connect errors with the resolver error a
/// few levels down the source chain. The messages matched are those of
/// hyper-util 0.1 (`dns error`) under reqwest 0.12 and of the system
/// resolver underneath it.
fn is_dns_error(err: &reqwest::Error) -> bool {
    if !err.is_connect() {
        return false;
    }

    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        let message = e.to_string();
        if message.contains("dns error")
            || message.contains("failed to lookup address")
            || message.contains("Name or service not known")
            || message.contains("nodename nor servname")
        {
            return true;
        }
        current = e.source();
    }
    false
}

fn error_chain(err: &reqwest::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut current = err.source();
    while let Some(e) = current {
        parts.push(e.to_string());
        current = e.source();
    }
    parts.join(": ")
}
