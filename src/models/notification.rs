use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::NotificationStatus;

/// A one-way message to a user, optionally linked to a chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_email: String,
    pub message: String,
    pub status: NotificationStatus,
    pub timestamp: NaiveDateTime,
    pub request_id: Option<i64>,
}

impl Notification {
    pub fn is_unread(&self) -> bool {
        self.status == NotificationStatus::Unread
    }
}
