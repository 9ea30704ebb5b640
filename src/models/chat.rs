use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::{RequestFlag, RequestStatus, UserRole};

/// A patient's request to chat with one doctor.
///
/// Names, ids and qualification are copied from the user records when the
/// request is created and are never refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub request_id: i64,
    pub patient_email: String,
    pub doctor_email: String,
    pub specialty: Option<String>,
    pub doctor_name: String,
    pub doctor_id: Option<String>,
    pub qualification: Option<String>,
    pub query: String,
    pub status: RequestStatus,
    pub patient_name: String,
    pub patient_id: String,
    pub flag: RequestFlag,
    pub timestamp: NaiveDateTime,
}

/// Caller input for opening a chat request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChatRequest {
    pub patient_email: String,
    pub doctor_email: String,
    /// Falls back to the doctor's own specialty when absent.
    #[serde(default)]
    pub specialty: Option<String>,
    pub query: String,
    #[serde(default)]
    pub flag: RequestFlag,
}

/// Row shape written by the repository; `request_id` comes from the store's sequence.
#[derive(Debug, Clone)]
pub struct ChatRequestRecord {
    pub patient_email: String,
    pub doctor_email: String,
    pub specialty: Option<String>,
    pub doctor_name: String,
    pub doctor_id: Option<String>,
    pub qualification: Option<String>,
    pub query: String,
    pub status: RequestStatus,
    pub patient_name: String,
    pub patient_id: String,
    pub flag: RequestFlag,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub request_id: i64,
    pub sender: String,
    pub role: UserRole,
    pub text: String,
    pub timestamp: NaiveDateTime,
}

/// A request together with its message history, as shown when a chat is opened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub request: ChatRequest,
    pub messages: Vec<ChatMessage>,
}
