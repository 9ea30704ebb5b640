use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use super::parse_timestamp;
use crate::db::DatabaseError;
use crate::models::*;

/// Store a password hash on an existing account. `false` when the email is unknown.
pub fn set_password_hash(
    conn: &Connection,
    email: &str,
    password_hash: &str,
) -> Result<bool, DatabaseError> {
    let updated = conn.execute(
        "UPDATE users SET password_hash = ?1 WHERE email = ?2",
        params![password_hash, email],
    )?;
    Ok(updated > 0)
}

pub fn get_password_hash(conn: &Connection, email: &str) -> Result<Option<String>, DatabaseError> {
    let result = conn.query_row(
        "SELECT password_hash FROM users WHERE email = ?1",
        params![email],
        |row| row.get::<_, Option<String>>(0),
    );

    match result {
        Ok(hash) => Ok(hash),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn insert_session(
    conn: &Connection,
    token_hash: &str,
    user_email: &str,
    created_at: &NaiveDateTime,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO sessions (token_hash, user_email, created_at) VALUES (?1, ?2, ?3)",
        params![token_hash, user_email, format_timestamp(created_at)],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(())
}

pub fn get_session(
    conn: &Connection,
    token_hash: &str,
) -> Result<Option<SessionRecord>, DatabaseError> {
    let result = conn.query_row(
        "SELECT token_hash, user_email, created_at FROM sessions WHERE token_hash = ?1",
        params![token_hash],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        },
    );

    match result {
        Ok((token_hash, user_email, created_at)) => Ok(Some(SessionRecord {
            token_hash,
            user_email,
            created_at: parse_timestamp(&created_at)?,
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn delete_session(conn: &Connection, token_hash: &str) -> Result<bool, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM sessions WHERE token_hash = ?1",
        params![token_hash],
    )?;
    Ok(deleted > 0)
}

/// Drop every session created before `cutoff`. Returns the number removed.
pub fn delete_sessions_before(
    conn: &Connection,
    cutoff: &NaiveDateTime,
) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM sessions WHERE created_at < ?1",
        params![format_timestamp(cutoff)],
    )?;
    Ok(deleted)
}
