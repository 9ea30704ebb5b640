//! Symptom checker endpoints.
//!
//! - `POST /api/symptoms/check`: run the checker (patients)
//! - `GET /api/submissions?patient_email=`: the submissions log

use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::enums::UserRole;
use crate::models::Submission;
use crate::session::SessionContext;
use crate::symptoms;

#[derive(Deserialize)]
pub struct CheckBody {
    pub symptoms: String,
}

pub async fn check(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<CheckBody>,
) -> Result<Json<Submission>, ApiError> {
    session.require_role(UserRole::Patient)?;
    let submission = ctx
        .with_db(move |conn| Ok(symptoms::check_symptoms(conn, &session.email, &body.symptoms)?))
        .await?;
    Ok(Json(submission))
}

#[derive(Deserialize)]
pub struct SubmissionsQuery {
    pub patient_email: Option<String>,
}

/// Patients only ever see their own submissions.
pub async fn submissions(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<SubmissionsQuery>,
) -> Result<Json<Vec<Submission>>, ApiError> {
    let patient_email = match session.role {
        UserRole::Patient => Some(session.email),
        UserRole::Doctor | UserRole::Admin => query.patient_email,
    };
    let found = ctx
        .with_db(move |conn| Ok(symptoms::list_submissions(conn, patient_email.as_deref())?))
        .await?;
    Ok(Json(found))
}
