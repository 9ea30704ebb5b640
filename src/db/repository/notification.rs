use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use super::parse_timestamp;
use crate::db::DatabaseError;
use crate::models::enums::NotificationStatus;
use crate::models::*;

pub fn insert_notification(
    conn: &Connection,
    user_email: &str,
    message: &str,
    request_id: Option<i64>,
    timestamp: &NaiveDateTime,
) -> Result<Notification, DatabaseError> {
    conn.execute(
        "INSERT INTO notifications (user_email, message, status, timestamp, request_id)
         VALUES (?1, ?2, 'unread', ?3, ?4)",
        params![user_email, message, format_timestamp(timestamp), request_id],
    )
    .map_err(DatabaseError::from_write)?;

    Ok(Notification {
        id: conn.last_insert_rowid(),
        user_email: user_email.to_string(),
        message: message.to_string(),
        status: NotificationStatus::Unread,
        timestamp: *timestamp,
        request_id,
    })
}

/// Newest first.
pub fn get_notifications_by_user(
    conn: &Connection,
    user_email: &str,
) -> Result<Vec<Notification>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_email, message, status, timestamp, request_id
         FROM notifications WHERE user_email = ?1
         ORDER BY timestamp DESC, id DESC",
    )?;

    let rows = stmt.query_map(params![user_email], |row| {
        Ok(NotificationRow {
            id: row.get(0)?,
            user_email: row.get(1)?,
            message: row.get(2)?,
            status: row.get(3)?,
            timestamp: row.get(4)?,
            request_id: row.get(5)?,
        })
    })?;

    let mut notifications = Vec::new();
    for row in rows {
        notifications.push(notification_from_row(row?)?);
    }
    Ok(notifications)
}

pub fn count_unread_notifications(conn: &Connection, user_email: &str) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM notifications WHERE user_email = ?1 AND status = 'unread'",
        params![user_email],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Returns whether a notification with this id exists.
pub fn mark_notification_read(conn: &Connection, id: i64) -> Result<bool, DatabaseError> {
    let updated = conn.execute(
        "UPDATE notifications SET status = 'read' WHERE id = ?1",
        params![id],
    )?;
    Ok(updated > 0)
}

/// Number of rows flipped from unread to read.
pub fn mark_notifications_read_by_request(
    conn: &Connection,
    request_id: i64,
    user_email: &str,
) -> Result<usize, DatabaseError> {
    let updated = conn.execute(
        "UPDATE notifications SET status = 'read'
         WHERE request_id = ?1 AND user_email = ?2 AND status = 'unread'",
        params![request_id, user_email],
    )?;
    Ok(updated)
}

pub fn mark_all_notifications_read(conn: &Connection, user_email: &str) -> Result<usize, DatabaseError> {
    let updated = conn.execute(
        "UPDATE notifications SET status = 'read' WHERE user_email = ?1 AND status = 'unread'",
        params![user_email],
    )?;
    Ok(updated)
}

struct NotificationRow {
    id: i64,
    user_email: String,
    message: String,
    status: String,
    timestamp: String,
    request_id: Option<i64>,
}

fn notification_from_row(row: NotificationRow) -> Result<Notification, DatabaseError> {
    Ok(Notification {
        id: row.id,
        user_email: row.user_email,
        message: row.message,
        status: NotificationStatus::from_str(&row.status)?,
        timestamp: parse_timestamp(&row.timestamp)?,
        request_id: row.request_id,
    })
}
