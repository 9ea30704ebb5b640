//! Chat request endpoints.
//!
//! Patients see their own requests, doctors the requests addressed to them,
//! admins everything. Only the request's doctor or an admin may change its
//! status.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::error::PortalError;
use crate::models::enums::{RequestFlag, RequestStatus, UserRole};
use crate::models::{ChatRequest, ChatRequestFilter, ChatSession, NewChatRequest};
use crate::requests;
use crate::session::SessionContext;

/// `GET /api/requests`: filtered list, narrowed to the caller's own requests
/// unless the caller is an admin.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Query(mut filter): Query<ChatRequestFilter>,
) -> Result<Json<Vec<ChatRequest>>, ApiError> {
    match session.role {
        UserRole::Patient => filter.patient_email = Some(session.email.clone()),
        UserRole::Doctor => filter.doctor_email = Some(session.email.clone()),
        UserRole::Admin => {}
    }
    let found = ctx
        .with_db(move |conn| Ok(requests::list_chat_requests(conn, &filter)?))
        .await?;
    Ok(Json(found))
}

/// `GET /api/requests/pending` (doctor): requests waiting on the caller.
pub async fn pending(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<Vec<ChatRequest>>, ApiError> {
    session.require_role(UserRole::Doctor)?;
    let found = ctx
        .with_db(move |conn| Ok(requests::pending_for_doctor(conn, &session.email)?))
        .await?;
    Ok(Json(found))
}

#[derive(Deserialize)]
pub struct CreateRequestBody {
    pub doctor_email: String,
    #[serde(default)]
    pub specialty: Option<String>,
    pub query: String,
    #[serde(default)]
    pub flag: RequestFlag,
}

/// `POST /api/requests`: a patient asks a doctor for a chat.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<CreateRequestBody>,
) -> Result<(StatusCode, Json<ChatRequest>), ApiError> {
    session.require_role(UserRole::Patient)?;
    let new = NewChatRequest {
        patient_email: session.email,
        doctor_email: body.doctor_email,
        specialty: body.specialty,
        query: body.query,
        flag: body.flag,
    };
    let request = ctx
        .with_db(move |conn| Ok(requests::create_chat_request(conn, &new)?))
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

#[derive(Deserialize)]
pub struct AssignBody {
    pub patient_email: String,
    pub doctor_email: String,
}

/// `POST /api/requests/assign` (admin): open an accepted chat directly.
pub async fn assign(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<AssignBody>,
) -> Result<(StatusCode, Json<ChatRequest>), ApiError> {
    let request = ctx
        .with_db(move |conn| {
            Ok(requests::assign_chat(
                conn,
                &session,
                &body.patient_email,
                &body.doctor_email,
            )?)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

#[derive(Deserialize)]
pub struct StatusBody {
    pub status: RequestStatus,
}

/// `POST /api/requests/:id/status`: accept or close.
pub async fn set_status(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Path(request_id): Path<i64>,
    Json(body): Json<StatusBody>,
) -> Result<Json<ChatRequest>, ApiError> {
    let updated = ctx
        .with_db(move |conn| {
            let request = requests::get_chat_request(conn, request_id)?;
            if !session.is_admin() && session.email != request.doctor_email {
                return Err(PortalError::Forbidden(format!(
                    "only the assigned doctor may change chat request {request_id}"
                ))
                .into());
            }
            Ok(requests::set_chat_request_status(conn, request_id, body.status)?)
        })
        .await?;
    Ok(Json(updated))
}

/// `GET /api/requests/:id/chat`: enter the chat as a participant.
pub async fn open_chat(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Path(request_id): Path<i64>,
) -> Result<Json<ChatSession>, ApiError> {
    let chat = ctx
        .with_db(move |conn| Ok(requests::open_chat(conn, &session, request_id)?))
        .await?;
    Ok(Json(chat))
}
