//! Accounts: patient registration, doctor management, sign-in and
//! first-run seeding.
//!
//! Sign-in checks a PBKDF2 password hash and hands back a random bearer token.
//! The store keeps only the token's SHA-256 digest and its creation time;
//! tokens older than `SESSION_TTL_HOURS` stop resolving.

use chrono::Duration;
use rusqlite::Connection;
use serde::Serialize;

use crate::config::SeedCredentials;
use crate::credentials;
use crate::db;
use crate::error::PortalError;
use crate::models::enums::UserRole;
use crate::models::{self, DoctorFilter, NewDoctor, User};
use crate::session::SessionContext;

pub const SESSION_TTL_HOURS: i64 = 12;

/// What a successful sign-in returns: the bearer token (shown once) and the
/// session it resolves to.
#[derive(Debug, Clone, Serialize)]
pub struct LoginGrant {
    pub token: String,
    #[serde(flatten)]
    pub session: SessionContext,
}

/// Specialties a doctor can be registered under and patients can filter by.
pub const SPECIALTIES: &[&str] = &[
    "Cardiology",
    "Orthopedics (Bone)",
    "Pulmonology (Lung)",
    "Nephrology (Kidney)",
    "Neurology",
    "Pediatrics",
];

pub fn list_users(conn: &Connection) -> Result<Vec<User>, PortalError> {
    Ok(db::get_all_users(conn)?)
}

pub fn get_user(conn: &Connection, email: &str) -> Result<User, PortalError> {
    db::get_user(conn, email.trim())?.ok_or_else(|| PortalError::not_found("User", email.trim()))
}

/// Insert an account, reporting a clash on email or doctor id as `Conflict`.
pub fn try_add_user(conn: &Connection, user: &User) -> Result<(), PortalError> {
    user.validate()?;
    db::insert_user(conn, user).map_err(|e| {
        PortalError::conflict_or(
            e,
            format!("user with email {} or doctor id already registered", user.email),
        )
    })?;
    tracing::info!(email = %user.email, role = %user.role, "User added");
    Ok(())
}

/// Insert an account. `Ok(false)` when the email or doctor id is already
/// registered; nothing is written in that case.
pub fn add_user(conn: &Connection, user: &User) -> Result<bool, PortalError> {
    match try_add_user(conn, user) {
        Ok(()) => Ok(true),
        Err(PortalError::Conflict(reason)) => {
            tracing::warn!(email = %user.email, %reason, "User not added");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Self-registration: creates a patient account that can sign in with `password`.
pub fn register_patient(
    conn: &Connection,
    email: &str,
    name: &str,
    password: &str,
    mobile: Option<&str>,
) -> Result<User, PortalError> {
    require_password(password)?;
    let user = User::patient(email, name, mobile);

    let tx = db::write_transaction(conn)?;
    try_add_user(&tx, &user)?;
    db::set_password_hash(&tx, &user.email, &credentials::hash_password(password))?;
    tx.commit()?;
    Ok(user)
}

pub fn add_doctor(conn: &Connection, doctor: NewDoctor) -> Result<User, PortalError> {
    let password = doctor.password.clone();
    let user = doctor.into_user()?;
    if let Some(ref specialty) = user.specialty {
        if !SPECIALTIES.contains(&specialty.as_str()) {
            return Err(PortalError::Validation(format!("unknown specialty: {specialty}")));
        }
    }

    let tx = db::write_transaction(conn)?;
    try_add_user(&tx, &user)?;
    db::set_password_hash(&tx, &user.email, &credentials::hash_password(&password))?;
    tx.commit()?;
    Ok(user)
}

/// Replace an account's password. Existing sessions stay valid.
pub fn set_password(conn: &Connection, email: &str, password: &str) -> Result<(), PortalError> {
    require_password(password)?;
    let hash = credentials::hash_password(password);
    if !db::set_password_hash(conn, email.trim(), &hash)? {
        return Err(PortalError::not_found("User", email.trim()));
    }
    tracing::info!(email = email.trim(), "Password set");
    Ok(())
}

/// Delete a doctor account. Returns the removed doctor's name, or `None` when
/// the email is unknown or does not belong to a doctor.
pub fn remove_user(conn: &Connection, email: &str) -> Result<Option<String>, PortalError> {
    let tx = db::write_transaction(conn)?;
    let removed = match db::get_user(&tx, email.trim())? {
        Some(user) if user.is_doctor() => {
            db::delete_user(&tx, &user.email)?;
            Some(user.name)
        }
        _ => None,
    };
    tx.commit()?;

    if let Some(ref name) = removed {
        tracing::info!(email = email.trim(), name = %name, "Doctor removed");
    }
    Ok(removed)
}

/// Like `remove_user`, but an unknown email or non-doctor account is `NotFound`.
pub fn remove_doctor(conn: &Connection, email: &str) -> Result<String, PortalError> {
    remove_user(conn, email)?.ok_or_else(|| PortalError::not_found("Doctor", email.trim()))
}

pub fn list_doctors(conn: &Connection, filter: &DoctorFilter) -> Result<Vec<User>, PortalError> {
    Ok(db::get_users_by_role(
        conn,
        UserRole::Doctor,
        filter.specialty.as_deref(),
    )?)
}

/// Sign in as `email` under `role` with `password`.
///
/// Unknown email, wrong password, an account without a password and a role
/// mismatch all fail the same way, with `Unauthorized`.
pub fn login(
    conn: &Connection,
    email: &str,
    password: &str,
    role: UserRole,
) -> Result<LoginGrant, PortalError> {
    let email = email.trim();
    let user = match db::get_user(conn, email)? {
        Some(user) if user.role == role => user,
        _ => {
            tracing::warn!(email, role = %role, "Sign-in rejected");
            return Err(PortalError::invalid_credentials());
        }
    };
    let verified = db::get_password_hash(conn, &user.email)?
        .is_some_and(|stored| credentials::verify_password(password, &stored));
    if !verified {
        tracing::warn!(email, role = %role, "Sign-in rejected");
        return Err(PortalError::invalid_credentials());
    }

    let token = credentials::generate_token();
    let now = models::now();
    let tx = db::write_transaction(conn)?;
    db::delete_sessions_before(&tx, &(now - Duration::hours(SESSION_TTL_HOURS)))?;
    db::insert_session(&tx, &credentials::hash_token(&token), &user.email, &now)?;
    tx.commit()?;

    tracing::info!(email = %user.email, role = %role, "Signed in");
    Ok(LoginGrant {
        token,
        session: SessionContext::for_user(&user),
    })
}

/// Resolve a bearer token into the session it was issued for.
pub fn authenticate(conn: &Connection, token: &str) -> Result<SessionContext, PortalError> {
    let token_hash = credentials::hash_token(token);
    let record = db::get_session(conn, &token_hash)?
        .ok_or_else(|| PortalError::Unauthorized("unknown session token".into()))?;

    if models::now() - record.created_at >= Duration::hours(SESSION_TTL_HOURS) {
        db::delete_session(conn, &token_hash)?;
        tracing::info!(email = %record.user_email, "Session expired");
        return Err(PortalError::Unauthorized("session expired".into()));
    }

    let user = db::get_user(conn, &record.user_email)?
        .ok_or_else(|| PortalError::Unauthorized("account no longer exists".into()))?;
    Ok(SessionContext::for_user(&user))
}

/// End the session behind `token`. `false` when it was already gone.
pub fn logout(conn: &Connection, token: &str) -> Result<bool, PortalError> {
    let ended = db::delete_session(conn, &credentials::hash_token(token))?;
    if ended {
        tracing::info!("Signed out");
    }
    Ok(ended)
}

fn require_password(password: &str) -> Result<(), PortalError> {
    if password.is_empty() {
        return Err(PortalError::Validation("password is required".into()));
    }
    Ok(())
}

/// Insert the default admin and doctor accounts into an empty store.
/// Returns the number of accounts created (0 when any account already exists).
pub fn seed_defaults(conn: &Connection, seed: &SeedCredentials) -> Result<usize, PortalError> {
    require_password(&seed.admin_password)?;
    require_password(&seed.doctor_password)?;

    let tx = db::write_transaction(conn)?;
    if db::count_users(&tx)? > 0 {
        return Ok(0);
    }

    let defaults = [
        (User::admin("admin@app.com", "System Admin"), &seed.admin_password),
        (
            User {
                email: "doctor@app.com".into(),
                role: UserRole::Doctor,
                name: "Dr. Afzal".into(),
                mobile: Some("7260023491".into()),
                specialty: Some("Cardiology".into()),
                doc_id: Some("101".into()),
                qualification: Some("MD".into()),
            },
            &seed.doctor_password,
        ),
    ];
    for (user, password) in &defaults {
        try_add_user(&tx, user)?;
        db::set_password_hash(&tx, &user.email, &credentials::hash_password(password))?;
    }
    tx.commit()?;

    tracing::info!(count = defaults.len(), "Seeded default accounts");
    Ok(defaults.len())
}
