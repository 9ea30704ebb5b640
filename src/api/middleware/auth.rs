//! Bearer token authentication middleware.
//!
//! Reads `Authorization: Bearer <token>`, resolves it against the sessions
//! table and injects the resulting `SessionContext` (plus the raw token, for
//! logout) into request extensions for downstream handlers.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::accounts;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionToken};

/// Require a valid session token.
///
/// Accesses `ApiContext` from request extensions (injected by Extension layer).
pub async fn require_session(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_session_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_session_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    let lookup = token.clone();
    let session = ctx
        .with_db(move |conn| Ok(accounts::authenticate(conn, &lookup)?))
        .await
        .inspect_err(|_| tracing::warn!(path = %req.uri().path(), "Rejected session token"))?;

    req.extensions_mut().insert(session);
    req.extensions_mut().insert(SessionToken(token));
    Ok(next.run(req).await)
}
