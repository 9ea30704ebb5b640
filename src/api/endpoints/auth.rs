//! Sign-in, registration and sign-out.
//!
//! `login` and `register` are reachable without a token; `logout` ends the
//! session that authenticated it.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::accounts::{self, LoginGrant};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionToken};
use crate::models::enums::UserRole;
use crate::models::User;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

/// `POST /api/login`: verify the password for `email` under `role` and issue
/// a bearer token.
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginGrant>, ApiError> {
    let grant = ctx
        .with_db(move |conn| Ok(accounts::login(conn, &body.email, &body.password, body.role)?))
        .await?;
    Ok(Json(grant))
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub mobile: Option<String>,
}

/// `POST /api/register`: patient self-registration.
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = ctx
        .with_db(move |conn| {
            Ok(accounts::register_patient(
                conn,
                &body.email,
                &body.name,
                &body.password,
                body.mobile.as_deref(),
            )?)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub ended: bool,
}

/// `POST /api/logout`
pub async fn logout(
    State(ctx): State<ApiContext>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> Result<Json<LogoutResponse>, ApiError> {
    let ended = ctx.with_db(move |conn| Ok(accounts::logout(conn, &token)?)).await?;
    Ok(Json(LogoutResponse { ended }))
}
