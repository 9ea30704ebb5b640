//! Repository layer: table-scoped database operations.
//!
//! One sub-module per table. All public functions are re-exported here and
//! take a borrowed `Connection`, so callers decide the transaction boundary.

mod chat_message;
mod chat_request;
mod credential;
mod feedback;
mod notification;
mod submission;
mod user;

use chrono::NaiveDateTime;

use super::DatabaseError;
use crate::models::TIMESTAMP_FORMAT;

pub use chat_message::*;
pub use chat_request::*;
pub use credential::*;
pub use feedback::*;
pub use notification::*;
pub use submission::*;
pub use user::*;

pub(crate) fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|e| DatabaseError::InvalidTimestamp(format!("{raw:?}: {e}")))
}
