//! Notification dispatch and read-state tracking.
//!
//! Notifications are appended as a side effect of request creation, status
//! changes and chat messages. They are only ever flipped from unread to read.

use rusqlite::Connection;

use crate::db::{self, DatabaseError};
use crate::error::PortalError;
use crate::models::{self, Notification};

/// Append an unread notification for `user_email`.
///
/// Runs on whatever connection or transaction the caller holds, so the
/// notification commits or rolls back together with the change it reports.
pub fn notify(
    conn: &Connection,
    user_email: &str,
    message: &str,
    request_id: Option<i64>,
) -> Result<Notification, PortalError> {
    if user_email.trim().is_empty() {
        return Err(PortalError::Validation("notification recipient is required".into()));
    }
    if message.trim().is_empty() {
        return Err(PortalError::Validation("notification message is required".into()));
    }

    let notification =
        db::insert_notification(conn, user_email, message, request_id, &models::now())?;
    tracing::debug!(
        notification_id = notification.id,
        recipient = user_email,
        request_id = ?request_id,
        "Notification queued"
    );
    Ok(notification)
}

pub fn list_notifications(conn: &Connection, user_email: &str) -> Result<Vec<Notification>, PortalError> {
    Ok(db::get_notifications_by_user(conn, user_email)?)
}

pub fn unread_count(conn: &Connection, user_email: &str) -> Result<i64, PortalError> {
    Ok(db::count_unread_notifications(conn, user_email)?)
}

pub fn mark_read(conn: &Connection, notification_id: i64) -> Result<(), PortalError> {
    if db::mark_notification_read(conn, notification_id)? {
        Ok(())
    } else {
        Err(PortalError::not_found("Notification", notification_id))
    }
}

/// Mark everything `user_email` was told about `request_id` as read.
/// Used when the user opens that chat.
pub fn mark_read_by_request(
    conn: &Connection,
    request_id: i64,
    user_email: &str,
) -> Result<usize, PortalError> {
    let updated = db::mark_notifications_read_by_request(conn, request_id, user_email)?;
    tracing::debug!(request_id, user = user_email, updated, "Marked chat notifications read");
    Ok(updated)
}

pub fn mark_all_read(conn: &Connection, user_email: &str) -> Result<usize, PortalError> {
    db::mark_all_notifications_read(conn, user_email).map_err(PortalError::from)
}

/// Only the notification's own recipient may mark it read.
pub(crate) fn owned_by(
    conn: &Connection,
    notification_id: i64,
    user_email: &str,
) -> Result<bool, PortalError> {
    let owner: Option<String> = match conn.query_row(
        "SELECT user_email FROM notifications WHERE id = ?1",
        [notification_id],
        |row| row.get(0),
    ) {
        Ok(owner) => Some(owner),
        Err(rusqlite::Error::QueryReturnedNoRows) => None,
        Err(e) => return Err(DatabaseError::from(e).into()),
    };
    match owner {
        Some(owner) => Ok(owner == user_email),
        None => Err(PortalError::not_found("Notification", notification_id)),
    }
}

// Message texts shown to recipients.

pub(crate) fn request_created_text(patient_name: &str, request_id: i64) -> String {
    format!("New chat request from {patient_name} (ID: {request_id})")
}

pub(crate) fn request_accepted_text(doctor_name: &str, request_id: i64) -> String {
    format!("Your chat request (ID: {request_id}) has been accepted by Dr. {doctor_name}")
}

pub(crate) fn request_closed_text(doctor_name: &str, request_id: i64) -> String {
    format!("Chat session (ID: {request_id}) with Dr. {doctor_name} has been closed")
}

pub(crate) fn message_posted_text(sender: &str, request_id: i64) -> String {
    format!("New message from {sender} in chat session (ID: {request_id})")
}
