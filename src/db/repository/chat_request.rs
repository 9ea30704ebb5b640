use std::str::FromStr;

use rusqlite::{params, Connection, Row};

use super::parse_timestamp;
use crate::db::DatabaseError;
use crate::models::enums::{RequestFlag, RequestStatus};
use crate::models::*;

const REQUEST_COLUMNS: &str = "request_id, patient_email, doctor_email, specialty, doctor_name,
     doctor_id, qualification, query, status, patient_name, patient_id, flag, timestamp";

/// Insert a request and return the id assigned by the `chat_requests` sequence.
pub fn insert_chat_request(
    conn: &Connection,
    record: &ChatRequestRecord,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO chat_requests (
            patient_email, doctor_email, specialty, doctor_name, doctor_id,
            qualification, query, status, patient_name, patient_id, flag, timestamp
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            record.patient_email,
            record.doctor_email,
            record.specialty,
            record.doctor_name,
            record.doctor_id,
            record.qualification,
            record.query,
            record.status.as_str(),
            record.patient_name,
            record.patient_id,
            record.flag.as_str(),
            format_timestamp(&record.timestamp),
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(conn.last_insert_rowid())
}

pub fn get_chat_request(
    conn: &Connection,
    request_id: i64,
) -> Result<Option<ChatRequest>, DatabaseError> {
    let result = conn.query_row(
        &format!("SELECT {REQUEST_COLUMNS} FROM chat_requests WHERE request_id = ?1"),
        params![request_id],
        read_request_row,
    );

    match result {
        Ok(row) => Ok(Some(request_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_chat_requests_filtered(
    conn: &Connection,
    filter: &ChatRequestFilter,
) -> Result<Vec<ChatRequest>, DatabaseError> {
    let mut sql = format!("SELECT {REQUEST_COLUMNS} FROM chat_requests WHERE 1=1");

    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(ref patient) = filter.patient_email {
        params_vec.push(Box::new(patient.clone()));
        sql.push_str(&format!(" AND patient_email = ?{}", params_vec.len()));
    }
    if let Some(ref doctor) = filter.doctor_email {
        params_vec.push(Box::new(doctor.clone()));
        sql.push_str(&format!(" AND doctor_email = ?{}", params_vec.len()));
    }
    if let Some(status) = filter.status {
        params_vec.push(Box::new(status.as_str()));
        sql.push_str(&format!(" AND status = ?{}", params_vec.len()));
    }
    if let Some(ref specialty) = filter.specialty {
        params_vec.push(Box::new(specialty.clone()));
        sql.push_str(&format!(" AND specialty = ?{}", params_vec.len()));
    }

    sql.push_str(" ORDER BY request_id ASC");

    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), read_request_row)?;

    let mut requests = Vec::new();
    for row in rows {
        requests.push(request_from_row(row?)?);
    }
    Ok(requests)
}

/// Set `status` only if the row still holds `expected`. Returns false when another
/// writer moved the request first.
pub fn update_chat_request_status(
    conn: &Connection,
    request_id: i64,
    expected: RequestStatus,
    status: RequestStatus,
) -> Result<bool, DatabaseError> {
    let updated = conn.execute(
        "UPDATE chat_requests SET status = ?1 WHERE request_id = ?2 AND status = ?3",
        params![status.as_str(), request_id, expected.as_str()],
    )?;
    Ok(updated == 1)
}

struct ChatRequestRow {
    request_id: i64,
    patient_email: String,
    doctor_email: String,
    specialty: Option<String>,
    doctor_name: String,
    doctor_id: Option<String>,
    qualification: Option<String>,
    query: String,
    status: String,
    patient_name: String,
    patient_id: String,
    flag: String,
    timestamp: String,
}

fn read_request_row(row: &Row<'_>) -> rusqlite::Result<ChatRequestRow> {
    Ok(ChatRequestRow {
        request_id: row.get(0)?,
        patient_email: row.get(1)?,
        doctor_email: row.get(2)?,
        specialty: row.get(3)?,
        doctor_name: row.get(4)?,
        doctor_id: row.get(5)?,
        qualification: row.get(6)?,
        query: row.get(7)?,
        status: row.get(8)?,
        patient_name: row.get(9)?,
        patient_id: row.get(10)?,
        flag: row.get(11)?,
        timestamp: row.get(12)?,
    })
}

fn request_from_row(row: ChatRequestRow) -> Result<ChatRequest, DatabaseError> {
    Ok(ChatRequest {
        request_id: row.request_id,
        patient_email: row.patient_email,
        doctor_email: row.doctor_email,
        specialty: row.specialty,
        doctor_name: row.doctor_name,
        doctor_id: row.doctor_id,
        qualification: row.qualification,
        query: row.query,
        status: RequestStatus::from_str(&row.status)?,
        patient_name: row.patient_name,
        patient_id: row.patient_id,
        flag: RequestFlag::from_str(&row.flag)?,
        timestamp: parse_timestamp(&row.timestamp)?,
    })
}
