//! # Admin Middleware
//!
//! Guards the admin routes: the request must carry a valid bearer token whose
//! subject is an email on the `ADMIN_EMAILS` allow-list.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, trace, warn};

use crate::error::AppError;
use crate::models::AppState;

/// Admin identity available to handlers behind [`admin_middleware`].
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub email: String,
}

/// Rejects the request with `401 Unauthorized` when the token is missing or
/// invalid, and with `403 Forbidden` when the token is valid but its email is
/// not an admin. Otherwise inserts [`AdminUser`] into the request extensions.
#[instrument(
    skip_all,
    fields(
        method = %req.method(),
        uri = %req.uri(),
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn admin_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim);

    let Some(token) = token else {
        warn!("Missing or malformed Authorization header");
        return Err(AppError::Unauthorized("Missing bearer token"));
    };
    trace!("Extracted bearer token from Authorization header");

    let claims = state.jwt_service.validate(token).map_err(|e| {
        warn!(error = %e, "Token validation failed");
        AppError::Unauthorized("Invalid token")
    })?;

    if !state.config.is_admin(&claims.sub) {
        warn!(email = %claims.sub, "Non-admin attempted admin access");
        return Err(AppError::Forbidden("Admin access required"));
    }

    debug!(email = %claims.sub, "Admin authenticated");
    req.extensions_mut().insert(AdminUser { email: claims.sub });
    Ok(next.run(req).await)
}
