//! Chat request lifecycle: Pending → Accepted → Closed.
//!
//! Every operation that changes a request also notifies the counterpart, and
//! both writes share one IMMEDIATE transaction. Request ids come from the
//! store's AUTOINCREMENT sequence, never from an in-process counter.

use rusqlite::Connection;

use crate::db;
use crate::error::PortalError;
use crate::models::enums::{RequestStatus, UserRole};
use crate::models::{
    self, ChatMessage, ChatRequest, ChatRequestFilter, ChatRequestRecord, ChatSession,
    NewChatRequest, User,
};
use crate::notifications;
use crate::session::SessionContext;

pub fn list_chat_requests(
    conn: &Connection,
    filter: &ChatRequestFilter,
) -> Result<Vec<ChatRequest>, PortalError> {
    Ok(db::get_chat_requests_filtered(conn, filter)?)
}

/// Requests still waiting on `doctor_email` to accept or decline, oldest first.
pub fn pending_for_doctor(
    conn: &Connection,
    doctor_email: &str,
) -> Result<Vec<ChatRequest>, PortalError> {
    list_chat_requests(conn, &ChatRequestFilter::pending_for_doctor(doctor_email.trim()))
}

pub fn get_chat_request(conn: &Connection, request_id: i64) -> Result<ChatRequest, PortalError> {
    db::get_chat_request(conn, request_id)?
        .ok_or_else(|| PortalError::not_found("Chat request", request_id))
}

/// Open a new Pending request and notify the doctor.
///
/// Fails when the doctor email does not belong to a doctor account or the
/// patient email does not belong to a patient account. Names, ids and
/// qualification are snapshotted from the current user records.
pub fn create_chat_request(
    conn: &Connection,
    new: &NewChatRequest,
) -> Result<ChatRequest, PortalError> {
    let tx = db::write_transaction(conn)?;
    let request = create_in(&tx, new)?;
    tx.commit()?;
    Ok(request)
}

pub fn accept(conn: &Connection, request_id: i64) -> Result<ChatRequest, PortalError> {
    set_chat_request_status(conn, request_id, RequestStatus::Accepted)
}

pub fn close(conn: &Connection, request_id: i64) -> Result<ChatRequest, PortalError> {
    set_chat_request_status(conn, request_id, RequestStatus::Closed)
}

/// Move a request to `status`, notifying the patient.
///
/// Only Pending → Accepted, Pending → Closed and Accepted → Closed are legal;
/// anything else is `IllegalTransition` and leaves the store untouched.
pub fn set_chat_request_status(
    conn: &Connection,
    request_id: i64,
    status: RequestStatus,
) -> Result<ChatRequest, PortalError> {
    let tx = db::write_transaction(conn)?;
    let request = transition_in(&tx, request_id, status)?;
    tx.commit()?;
    Ok(request)
}

/// Messages of one request in send order. Unknown request is `NotFound`.
pub fn list_messages(conn: &Connection, request_id: i64) -> Result<Vec<ChatMessage>, PortalError> {
    get_chat_request(conn, request_id)?;
    Ok(db::get_messages_by_request(conn, request_id)?)
}

/// Append a message to an open request and notify the other participant:
/// the doctor when a patient writes, the patient otherwise.
pub fn post_message(
    conn: &Connection,
    request_id: i64,
    sender: &str,
    role: UserRole,
    text: &str,
) -> Result<ChatMessage, PortalError> {
    let sender = sender.trim();
    if sender.is_empty() {
        return Err(PortalError::Validation("message sender is required".into()));
    }
    if text.trim().is_empty() {
        return Err(PortalError::Validation("message text is required".into()));
    }

    let tx = db::write_transaction(conn)?;
    let request = get_chat_request(&tx, request_id)?;
    if request.status.is_terminal() {
        tracing::warn!(request_id, sender, "Message rejected on closed chat");
        return Err(PortalError::IllegalTransition {
            request_id,
            from: request.status,
            action: "post a message to",
        });
    }

    let message = db::insert_chat_message(&tx, request_id, sender, role, text, &models::now())?;
    let recipient = match role {
        UserRole::Patient => &request.doctor_email,
        UserRole::Doctor | UserRole::Admin => &request.patient_email,
    };
    notifications::notify(
        &tx,
        recipient,
        &notifications::message_posted_text(sender, request_id),
        Some(request_id),
    )?;
    tx.commit()?;

    tracing::debug!(request_id, message_id = message.id, role = %role, "Chat message posted");
    Ok(message)
}

/// Admin-initiated chat: creates the request under the doctor's own specialty
/// and accepts it in the same transaction.
pub fn assign_chat(
    conn: &Connection,
    ctx: &SessionContext,
    patient_email: &str,
    doctor_email: &str,
) -> Result<ChatRequest, PortalError> {
    ctx.require_admin()?;

    let tx = db::write_transaction(conn)?;
    let patient = require_user(&tx, patient_email, "Patient")?;
    let doctor = require_user(&tx, doctor_email, "Doctor")?;
    let new = NewChatRequest {
        patient_email: patient.email.clone(),
        doctor_email: doctor.email.clone(),
        specialty: None,
        query: format!(
            "Admin-initiated chat between {} and {}",
            patient.name, doctor.name
        ),
        flag: Default::default(),
    };
    let created = create_in(&tx, &new)?;
    let accepted = transition_in(&tx, created.request_id, RequestStatus::Accepted)?;
    tx.commit()?;

    tracing::info!(request_id = accepted.request_id, admin = %ctx.email, "Chat assigned");
    Ok(accepted)
}

/// Enter a chat as one of its participants: clears the caller's unread
/// notifications for it and returns the request with its history.
pub fn open_chat(
    conn: &Connection,
    ctx: &SessionContext,
    request_id: i64,
) -> Result<ChatSession, PortalError> {
    let tx = db::write_transaction(conn)?;
    let request = get_chat_request(&tx, request_id)?;
    if !ctx.is_participant(&request) {
        return Err(PortalError::Forbidden(format!(
            "{} is not a participant of chat request {request_id}",
            ctx.email
        )));
    }
    if request.status.is_terminal() {
        return Err(PortalError::IllegalTransition {
            request_id,
            from: request.status,
            action: "open",
        });
    }

    notifications::mark_read_by_request(&tx, request_id, &ctx.email)?;
    let messages = db::get_messages_by_request(&tx, request_id)?;
    tx.commit()?;

    Ok(ChatSession { request, messages })
}

fn create_in(conn: &Connection, new: &NewChatRequest) -> Result<ChatRequest, PortalError> {
    if new.query.trim().is_empty() {
        return Err(PortalError::Validation("a reason for consultation is required".into()));
    }

    let patient = require_user(conn, &new.patient_email, "Patient")?;
    if patient.role != UserRole::Patient {
        return Err(PortalError::Validation(format!(
            "{} is not a patient account",
            patient.email
        )));
    }
    let doctor = require_user(conn, &new.doctor_email, "Doctor")?;
    if !doctor.is_doctor() {
        return Err(PortalError::Validation(format!(
            "{} is not a doctor account",
            doctor.email
        )));
    }

    let requested = new.specialty.as_deref().map(str::trim).filter(|s| !s.is_empty());
    if let Some(requested) = requested {
        if doctor.specialty.as_deref() != Some(requested) {
            return Err(PortalError::Validation(format!(
                "{} does not practice {requested}",
                doctor.name
            )));
        }
    }
    let specialty = doctor.specialty.clone();

    let record = ChatRequestRecord {
        patient_email: patient.email.clone(),
        doctor_email: doctor.email.clone(),
        specialty,
        doctor_name: doctor.name.clone(),
        doctor_id: doctor.doc_id.clone(),
        qualification: doctor.qualification.clone(),
        query: new.query.trim().to_string(),
        status: RequestStatus::Pending,
        patient_name: patient.name.clone(),
        patient_id: patient.patient_code(),
        flag: new.flag,
        timestamp: models::now(),
    };
    let request_id = db::insert_chat_request(conn, &record)?;

    notifications::notify(
        conn,
        &doctor.email,
        &notifications::request_created_text(&patient.name, request_id),
        Some(request_id),
    )?;

    tracing::info!(
        request_id,
        patient = %patient.email,
        doctor = %doctor.email,
        "Chat request created"
    );

    Ok(ChatRequest {
        request_id,
        patient_email: record.patient_email,
        doctor_email: record.doctor_email,
        specialty: record.specialty,
        doctor_name: record.doctor_name,
        doctor_id: record.doctor_id,
        qualification: record.qualification,
        query: record.query,
        status: record.status,
        patient_name: record.patient_name,
        patient_id: record.patient_id,
        flag: record.flag,
        timestamp: record.timestamp,
    })
}

fn transition_in(
    conn: &Connection,
    request_id: i64,
    status: RequestStatus,
) -> Result<ChatRequest, PortalError> {
    let mut request = get_chat_request(conn, request_id)?;
    let from = request.status;
    let rejected = || PortalError::IllegalTransition {
        request_id,
        from,
        action: action_name(status),
    };

    if !from.can_transition_to(status) {
        tracing::warn!(request_id, from = %from, to = %status, "Illegal status transition");
        return Err(rejected());
    }
    if !db::update_chat_request_status(conn, request_id, from, status)? {
        return Err(rejected());
    }
    request.status = status;

    let text = match status {
        RequestStatus::Accepted => notifications::request_accepted_text(&request.doctor_name, request_id),
        _ => notifications::request_closed_text(&request.doctor_name, request_id),
    };
    notifications::notify(conn, &request.patient_email, &text, Some(request_id))?;

    tracing::info!(request_id, from = %from, to = %status, "Chat request status changed");
    Ok(request)
}

fn require_user(conn: &Connection, email: &str, entity: &'static str) -> Result<User, PortalError> {
    db::get_user(conn, email.trim())?.ok_or_else(|| PortalError::not_found(entity, email.trim()))
}

fn action_name(target: RequestStatus) -> &'static str {
    match target {
        RequestStatus::Pending => "reopen",
        RequestStatus::Accepted => "accept",
        RequestStatus::Closed => "close",
    }
}
