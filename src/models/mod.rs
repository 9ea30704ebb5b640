//! Typed records, one per table, plus their string-backed enums and filters.

pub mod chat;
pub mod enums;
pub mod feedback;
pub mod filters;
pub mod notification;
pub mod submission;
pub mod user;

pub use chat::*;
pub use feedback::*;
pub use filters::*;
pub use notification::*;
pub use submission::*;
pub use user::*;

use chrono::{Local, NaiveDateTime, Timelike};

/// Storage format for every timestamp column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time truncated to whole seconds, matching what the store keeps.
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

pub(crate) fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}
