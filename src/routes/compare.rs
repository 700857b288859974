use actix_web::{web, HttpRequest, HttpResponse, Responder};
use std::sync::Arc;
use tracing::Instrument;

use crate::core::errors::ComparisonError;
use crate::core::Comparator;
use crate::models::{CompareQuery, ComparisonRequest, ComparisonResponse, HealthResponse};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub comparator: Arc<Comparator>,
    pub secret: String,
}

/// Configure the comparison and health routes
pub fn configure(cfg: &mut web::ServiceConfig, compare_path: &str) {
    cfg.route("/health", web::get().to(health_check))
        .route(compare_path, web::post().to(compare));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Compare images endpoint
///
/// POST <compare_path>?secret=<secret>
///
/// Request body:
/// ```json
/// {
///   "urls": ["string"]
/// }
/// ```
///
/// Always answers 200; failures are listed in the `errors` array.
async fn compare(state: web::Data<AppState>, req: HttpRequest, body: web::Bytes) -> impl Responder {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("compare", %request_id);

    async move {
        let request: ComparisonRequest = match serde_json::from_slice(&body) {
            Ok(request) => request,
            Err(e) => {
                return send_response(ComparisonResponse::error(format!(
                    "unable to decode the request: {}",
                    e
                )));
            }
        };

        // A malformed query string counts as a missing secret
        let query = web::Query::<CompareQuery>::from_query(req.query_string())
            .map(|q| q.into_inner())
            .unwrap_or_default();

        if request.effective_secret(&query) != Some(state.secret.as_str()) {
            return send_response(ComparisonResponse::error(
                ComparisonError::WrongSecret.to_string(),
            ));
        }

        tracing::info!("Comparing {} images", request.urls.len());

        let report = state.comparator.compare_images(&request.urls).await;

        send_response(ComparisonResponse::from(report))
    }
    .instrument(span)
    .await
}

fn send_response(response: ComparisonResponse) -> HttpResponse {
    for error in &response.errors {
        tracing::error!("{}", error);
    }

    HttpResponse::Ok().json(response)
}
