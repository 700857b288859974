use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

use crate::config::RecognitionSettings;
use crate::core::comparator::RecognitionClient;
use crate::core::errors::{BackendErrorCode, RecognitionError};
use crate::models::{FaceComparison, FaceMatchCounts};

#[derive(Debug, Serialize)]
struct CompareFacesRequest {
    source_image: String,
    target_image: String,
    similarity_threshold: f64,
}

#[derive(Debug, Deserialize)]
struct CompareFacesResponse {
    #[serde(default)]
    face_matches: usize,
    #[serde(default)]
    unmatched_faces: usize,
}

/// Error body, possibly with the counts gathered before the failure
#[derive(Debug, Default, Deserialize)]
struct BackendErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    face_matches: usize,
    #[serde(default)]
    unmatched_faces: usize,
}

#[derive(Debug, Serialize)]
struct DetectFacesRequest {
    image: String,
    attributes: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
struct DetectFacesResponse {
    #[serde(default)]
    face_details: Vec<FaceDetail>,
}

#[derive(Debug, Deserialize)]
struct FaceDetail {
    gender: Option<GenderAttribute>,
}

#[derive(Debug, Deserialize)]
struct GenderAttribute {
    value: String,
}

/// Recognition backend client
///
/// Handles all communication with the face recognition backend:
/// - comparing the faces of two images
/// - predicting the gender of the face in an image
pub struct HttpRecognitionClient {
    base_url: String,
    access_key_id: String,
    secret_access_key: String,
    region: String,
    similarity_threshold: f64,
    client: Client,
}

impl HttpRecognitionClient {
    pub fn new(settings: &RecognitionSettings) -> Self {
        Self::with_client(settings, Client::new())
    }

    pub fn with_client(settings: &RecognitionSettings, client: Client) -> Self {
        Self {
            base_url: settings.endpoint.trim_end_matches('/').to_string(),
            access_key_id: settings.access_key_id.clone(),
            secret_access_key: settings.secret_access_key.clone(),
            region: settings.region.clone(),
            similarity_threshold: settings.similarity_threshold,
            client,
        }
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}/{}", self.base_url, path))
            .header("X-Access-Key-Id", &self.access_key_id)
            .header("X-Secret-Access-Key", &self.secret_access_key)
            .header("X-Region", &self.region)
    }

    async fn send_compare(&self, source: &[u8], target: &[u8]) -> Result<FaceComparison, RecognitionError> {
        let body = CompareFacesRequest {
            source_image: STANDARD.encode(source),
            target_image: STANDARD.encode(target),
            similarity_threshold: self.similarity_threshold,
        };

        let response = self.post("compare-faces").json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            let parsed: CompareFacesResponse = serde_json::from_str(&text).map_err(|e| {
                RecognitionError::InvalidResponse(format!("failed to parse comparison: {}", e))
            })?;
            return Ok(FaceComparison::ok(FaceMatchCounts::new(
                parsed.unmatched_faces,
                parsed.face_matches,
            )));
        }

        let error = parse_error_body(status, &text);
        Ok(FaceComparison::failed(
            FaceMatchCounts::new(error.unmatched_faces, error.face_matches),
            RecognitionError::Backend {
                code: BackendErrorCode::parse(&error.code),
                message: error.message,
            },
        ))
    }

    async fn detect_gender(&self, image: &[u8]) -> Result<String, RecognitionError> {
        let body = DetectFacesRequest {
            image: STANDARD.encode(image),
            attributes: vec!["ALL"],
        };

        let response = self.post("detect-faces").json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let error = parse_error_body(status, &text);
            return Err(RecognitionError::Backend {
                code: BackendErrorCode::parse(&error.code),
                message: error.message,
            });
        }

        let parsed: DetectFacesResponse = serde_json::from_str(&text).map_err(|e| {
            RecognitionError::InvalidResponse(format!("failed to parse face details: {}", e))
        })?;

        let face = parsed
            .face_details
            .into_iter()
            .next()
            .ok_or(RecognitionError::NoFaceDetails)?;

        face.gender
            .map(|g| g.value.to_lowercase())
            .ok_or_else(|| RecognitionError::InvalidResponse("face without gender".to_string()))
    }
}

fn parse_error_body(status: reqwest::StatusCode, text: &str) -> BackendErrorBody {
    serde_json::from_str(text).unwrap_or_else(|_| BackendErrorBody {
        message: format!("status {}: {}", status, text),
        ..BackendErrorBody::default()
    })
}

#[async_trait]
impl RecognitionClient for HttpRecognitionClient {
    async fn compare_faces(&self, source: &[u8], target: &[u8]) -> FaceComparison {
        match self.send_compare(source, target).await {
            Ok(comparison) => comparison,
            Err(err) => {
                tracing::debug!("compare-faces call failed: {}", err);
                FaceComparison::failed(FaceMatchCounts::default(), err)
            }
        }
    }

    async fn predict_gender(&self, image: &[u8]) -> Result<String, RecognitionError> {
        self.detect_gender(image).await.map_err(|err| match err {
            RecognitionError::NoFaceDetails => RecognitionError::NoFaceDetails,
            other => RecognitionError::GenderPrediction(Box::new(other)),
        })
    }
}
