use axum::http::StatusCode;
use tracing::{debug, instrument};

/// GET /health-check
///
/// Liveness probe. Touches neither the store nor any other service.
#[instrument]
pub async fn health_check() -> StatusCode {
    debug!("Health check endpoint accessed");
    StatusCode::OK
}
