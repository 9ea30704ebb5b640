use rusqlite::Connection;

use crate::db;
use crate::error::PortalError;
use crate::models::{self, Feedback, NewFeedback};

pub fn add_feedback(conn: &Connection, entry: &NewFeedback) -> Result<Feedback, PortalError> {
    if entry.user_email.trim().is_empty() {
        return Err(PortalError::Validation("feedback needs a user email".into()));
    }
    if entry.feedback.trim().is_empty() {
        return Err(PortalError::Validation("feedback text is required".into()));
    }

    let stored = db::insert_feedback(conn, entry, &models::now())?;
    tracing::info!(feedback_id = stored.id, user = %stored.user_email, "Feedback received");
    Ok(stored)
}

pub fn list_feedback(conn: &Connection) -> Result<Vec<Feedback>, PortalError> {
    Ok(db::get_all_feedback(conn)?)
}
