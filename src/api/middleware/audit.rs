//! Access logging middleware.
//!
//! Logs every API request with the acting user, method, path and response
//! status. Runs innermost (after auth has injected `SessionContext`).

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::session::SessionContext;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let actor = req
        .extensions()
        .get::<SessionContext>()
        .map(|s| s.email.clone())
        .unwrap_or_else(|| "anonymous".to_string());

    let response = next.run(req).await;

    tracing::info!(
        %method,
        path = %path,
        actor = %actor,
        status = response.status().as_u16(),
        "API access"
    );
    response
}
