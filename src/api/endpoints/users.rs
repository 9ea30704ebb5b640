//! Account endpoints.
//!
//! - `GET /api/users` (admin): every account
//! - `POST /api/users/doctors` (admin): register a doctor
//! - `DELETE /api/users/:email` (admin): remove a doctor
//! - `GET /api/doctors?specialty=`: doctors, optionally by specialty

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Serialize;

use crate::accounts;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{DoctorFilter, NewDoctor, User};
use crate::session::SessionContext;

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<Vec<User>>, ApiError> {
    session.require_admin()?;
    let users = ctx.with_db(|conn| Ok(accounts::list_users(conn)?)).await?;
    Ok(Json(users))
}

pub async fn add_doctor(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Json(doctor): Json<NewDoctor>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    session.require_admin()?;
    let user = ctx
        .with_db(move |conn| Ok(accounts::add_doctor(conn, doctor)?))
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Serialize)]
pub struct RemovedUser {
    pub email: String,
    pub name: String,
}

pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Path(email): Path<String>,
) -> Result<Json<RemovedUser>, ApiError> {
    session.require_admin()?;
    let removed = ctx
        .with_db(move |conn| {
            let name = accounts::remove_doctor(conn, &email)?;
            Ok(RemovedUser { email, name })
        })
        .await?;
    Ok(Json(removed))
}

pub async fn doctors(
    State(ctx): State<ApiContext>,
    Query(filter): Query<DoctorFilter>,
) -> Result<Json<Vec<User>>, ApiError> {
    let found = ctx
        .with_db(move |conn| Ok(accounts::list_doctors(conn, &filter)?))
        .await?;
    Ok(Json(found))
}
