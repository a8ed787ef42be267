use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::services::AuthService;

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let token = headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?
        .trim();

    (!token.is_empty()).then_some(token)
}

/// Rejects requests without a valid bearer token and attaches the caller as a
/// [`CurrentUser`] extension. No token is a 401, a bad one is a 403.
pub async fn require_auth(
    State(auth): State<AuthService>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = extract_bearer(req.headers()) else {
        tracing::warn!(uri = %req.uri(), "Request without access token");
        return Err(AppError::Unauthorized("Access token required".to_string()));
    };

    let claims = auth.verify_token(token).map_err(|e| {
        tracing::warn!(uri = %req.uri(), error = %e, "Rejected access token");
        AppError::Forbidden("Invalid token".to_string())
    })?;

    req.extensions_mut().insert(CurrentUser::from(claims));
    Ok(next.run(req).await)
}
