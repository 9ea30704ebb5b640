use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::feedback;
use crate::models::{Feedback, NewFeedback};
use crate::session::SessionContext;

/// `GET /api/feedback` (admin)
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<Vec<Feedback>>, ApiError> {
    session.require_admin()?;
    let entries = ctx.with_db(|conn| Ok(feedback::list_feedback(conn)?)).await?;
    Ok(Json(entries))
}

#[derive(Deserialize)]
pub struct FeedbackBody {
    pub feedback: String,
}

/// `POST /api/feedback`
pub async fn submit(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<FeedbackBody>,
) -> Result<(StatusCode, Json<Feedback>), ApiError> {
    let entry = NewFeedback {
        user_email: session.email,
        feedback: body.feedback,
    };
    let saved = ctx.with_db(move |conn| Ok(feedback::add_feedback(conn, &entry)?)).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}
