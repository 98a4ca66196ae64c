use axum::{extract::FromRequestParts, http::request::Parts};

use super::error::AppError;

pub const HEADER_XAUTH: &str = "X-Auth-Token";

/// ID token presented by the caller, taken from `Authorization: Bearer …`
/// or, as the web front-end sends it, `X-Auth-Token`.
pub struct AuthToken(pub String);

impl<S> FromRequestParts<S> for AuthToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // A non-bearer Authorization header (e.g. Basic from a proxy) falls
        // through to X-Auth-Token.
        if let Some(token) = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
        {
            return non_empty(token);
        }

        if let Some(header) = parts.headers.get(HEADER_XAUTH) {
            let token = header
                .to_str()
                .map_err(|_| AppError::Unauthorized("Invalid header string".into()))?;
            return non_empty(token);
        }

        Err(AppError::Unauthorized("Missing authentication token".to_string()))
    }
}

fn non_empty(token: &str) -> Result<AuthToken, AppError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::Unauthorized("Empty authentication token".into()));
    }
    Ok(AuthToken(token.to_string()))
}
