//! Notification endpoints. Every route acts on the caller's own inbox.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::error::PortalError;
use crate::models::Notification;
use crate::notifications;
use crate::session::SessionContext;

#[derive(Serialize)]
pub struct InboxResponse {
    pub unread: i64,
    pub notifications: Vec<Notification>,
}

/// `GET /api/notifications`: newest first, with the unread count.
pub async fn inbox(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<InboxResponse>, ApiError> {
    let inbox = ctx
        .with_db(move |conn| {
            Ok(InboxResponse {
                unread: notifications::unread_count(conn, &session.email)?,
                notifications: notifications::list_notifications(conn, &session.email)?,
            })
        })
        .await?;
    Ok(Json(inbox))
}

#[derive(Serialize)]
pub struct MarkedResponse {
    pub updated: usize,
}

/// `POST /api/notifications/:id/read`
pub async fn mark_read(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Path(notification_id): Path<i64>,
) -> Result<Json<MarkedResponse>, ApiError> {
    ctx.with_db(move |conn| {
        if !notifications::owned_by(conn, notification_id, &session.email)? {
            return Err(PortalError::Forbidden(format!(
                "notification {notification_id} belongs to another user"
            ))
            .into());
        }
        Ok(notifications::mark_read(conn, notification_id)?)
    })
    .await?;
    Ok(Json(MarkedResponse { updated: 1 }))
}

/// `POST /api/notifications/read-all`
pub async fn mark_all_read(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<MarkedResponse>, ApiError> {
    let updated = ctx
        .with_db(move |conn| Ok(notifications::mark_all_read(conn, &session.email)?))
        .await?;
    Ok(Json(MarkedResponse { updated }))
}
