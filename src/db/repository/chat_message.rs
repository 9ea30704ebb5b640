use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use super::parse_timestamp;
use crate::db::DatabaseError;
use crate::models::enums::UserRole;
use crate::models::*;

pub fn insert_chat_message(
    conn: &Connection,
    request_id: i64,
    sender: &str,
    role: UserRole,
    text: &str,
    timestamp: &NaiveDateTime,
) -> Result<ChatMessage, DatabaseError> {
    conn.execute(
        "INSERT INTO chat_messages (request_id, sender, role, text, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            request_id,
            sender,
            role.as_str(),
            text,
            format_timestamp(timestamp),
        ],
    )
    .map_err(DatabaseError::from_write)?;

    Ok(ChatMessage {
        id: conn.last_insert_rowid(),
        request_id,
        sender: sender.to_string(),
        role,
        text: text.to_string(),
        timestamp: *timestamp,
    })
}

pub fn get_messages_by_request(
    conn: &Connection,
    request_id: i64,
) -> Result<Vec<ChatMessage>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, request_id, sender, role, text, timestamp
         FROM chat_messages WHERE request_id = ?1 ORDER BY id ASC",
    )?;

    let rows = stmt.query_map(params![request_id], |row| {
        Ok(MessageRow {
            id: row.get(0)?,
            request_id: row.get(1)?,
            sender: row.get(2)?,
            role: row.get(3)?,
            text: row.get(4)?,
            timestamp: row.get(5)?,
        })
    })?;

    let mut messages = Vec::new();
    for row in rows {
        messages.push(message_from_row(row?)?);
    }
    Ok(messages)
}

struct MessageRow {
    id: i64,
    request_id: i64,
    sender: String,
    role: String,
    text: String,
    timestamp: String,
}

fn message_from_row(row: MessageRow) -> Result<ChatMessage, DatabaseError> {
    Ok(ChatMessage {
        id: row.id,
        request_id: row.request_id,
        sender: row.sender,
        role: UserRole::from_str(&row.role)?,
        text: row.text,
        timestamp: parse_timestamp(&row.timestamp)?,
    })
}
