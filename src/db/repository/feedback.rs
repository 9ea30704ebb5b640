use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use super::parse_timestamp;
use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_feedback(
    conn: &Connection,
    entry: &NewFeedback,
    timestamp: &NaiveDateTime,
) -> Result<Feedback, DatabaseError> {
    conn.execute(
        "INSERT INTO feedback (user_email, feedback, timestamp) VALUES (?1, ?2, ?3)",
        params![entry.user_email, entry.feedback, format_timestamp(timestamp)],
    )?;

    Ok(Feedback {
        id: conn.last_insert_rowid(),
        user_email: entry.user_email.clone(),
        feedback: entry.feedback.clone(),
        timestamp: *timestamp,
    })
}

pub fn get_all_feedback(conn: &Connection) -> Result<Vec<Feedback>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_email, feedback, timestamp FROM feedback ORDER BY id ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        let (id, user_email, feedback, timestamp) = row?;
        entries.push(Feedback {
            id,
            user_email,
            feedback,
            timestamp: parse_timestamp(&timestamp)?,
        });
    }
    Ok(entries)
}
