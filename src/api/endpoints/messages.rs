//! Chat message endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::error::PortalError;
use crate::models::ChatMessage;
use crate::requests;
use crate::session::SessionContext;

/// `GET /api/requests/:id/messages`: history in send order.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Path(request_id): Path<i64>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    let messages = ctx
        .with_db(move |conn| {
            let request = requests::get_chat_request(conn, request_id)?;
            session.require_visible(&request)?;
            Ok(requests::list_messages(conn, request_id)?)
        })
        .await?;
    Ok(Json(messages))
}

#[derive(Deserialize)]
pub struct PostMessageBody {
    pub text: String,
}

/// `POST /api/requests/:id/messages`: participants only; the sender is the
/// signed-in account.
pub async fn post(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Path(request_id): Path<i64>,
    Json(body): Json<PostMessageBody>,
) -> Result<(StatusCode, Json<ChatMessage>), ApiError> {
    let message = ctx
        .with_db(move |conn| {
            let request = requests::get_chat_request(conn, request_id)?;
            if !session.is_participant(&request) {
                return Err(PortalError::Forbidden(format!(
                    "{} is not a participant of chat request {request_id}",
                    session.email
                ))
                .into());
            }
            Ok(requests::post_message(
                conn,
                request_id,
                &session.name,
                session.role,
                &body.text,
            )?)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}
