use std::str::FromStr;

use rusqlite::{params, Connection, Row};

use crate::db::DatabaseError;
use crate::models::enums::UserRole;
use crate::models::*;

const USER_COLUMNS: &str = "email, role, name, mobile, specialty, doc_id, qualification";

pub fn insert_user(conn: &Connection, user: &User) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO users (email, role, name, mobile, specialty, doc_id, qualification)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            user.email,
            user.role.as_str(),
            user.name,
            user.mobile,
            user.specialty,
            user.doc_id,
            user.qualification,
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(())
}

pub fn get_user(conn: &Connection, email: &str) -> Result<Option<User>, DatabaseError> {
    let result = conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
        params![email],
        read_user_row,
    );

    match result {
        Ok(row) => Ok(Some(user_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_all_users(conn: &Connection) -> Result<Vec<User>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY rowid ASC"
    ))?;
    let rows = stmt.query_map([], read_user_row)?;

    let mut users = Vec::new();
    for row in rows {
        users.push(user_from_row(row?)?);
    }
    Ok(users)
}

/// Users holding `role`, optionally narrowed to one specialty.
pub fn get_users_by_role(
    conn: &Connection,
    role: UserRole,
    specialty: Option<&str>,
) -> Result<Vec<User>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users
         WHERE role = ?1 AND (?2 IS NULL OR specialty = ?2)
         ORDER BY name ASC"
    ))?;
    let rows = stmt.query_map(params![role.as_str(), specialty], read_user_row)?;

    let mut users = Vec::new();
    for row in rows {
        users.push(user_from_row(row?)?);
    }
    Ok(users)
}

pub fn delete_user(conn: &Connection, email: &str) -> Result<bool, DatabaseError> {
    let deleted = conn.execute("DELETE FROM users WHERE email = ?1", params![email])?;
    Ok(deleted > 0)
}

pub fn count_users(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    Ok(count)
}

struct UserRow {
    email: String,
    role: String,
    name: String,
    mobile: Option<String>,
    specialty: Option<String>,
    doc_id: Option<String>,
    qualification: Option<String>,
}

fn read_user_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        email: row.get(0)?,
        role: row.get(1)?,
        name: row.get(2)?,
        mobile: row.get(3)?,
        specialty: row.get(4)?,
        doc_id: row.get(5)?,
        qualification: row.get(6)?,
    })
}

fn user_from_row(row: UserRow) -> Result<User, DatabaseError> {
    Ok(User {
        email: row.email,
        role: UserRole::from_str(&row.role)?,
        name: row.name,
        mobile: row.mobile,
        specialty: row.specialty,
        doc_id: row.doc_id,
        qualification: row.qualification,
    })
}
