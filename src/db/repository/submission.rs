use rusqlite::{params, Connection};

use super::parse_timestamp;
use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_submission(conn: &Connection, sub: &NewSubmission) -> Result<Submission, DatabaseError> {
    conn.execute(
        "INSERT INTO submissions (date, symptoms, prediction, patient_email)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            format_timestamp(&sub.date),
            sub.symptoms,
            sub.prediction,
            sub.patient_email,
        ],
    )?;

    Ok(Submission {
        id: conn.last_insert_rowid(),
        date: sub.date,
        symptoms: sub.symptoms.clone(),
        prediction: sub.prediction.clone(),
        patient_email: sub.patient_email.clone(),
    })
}

/// All submissions, or only one patient's when `patient_email` is given.
pub fn get_submissions(
    conn: &Connection,
    patient_email: Option<&str>,
) -> Result<Vec<Submission>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, date, symptoms, prediction, patient_email FROM submissions
         WHERE (?1 IS NULL OR patient_email = ?1)
         ORDER BY id ASC",
    )?;

    let rows = stmt.query_map(params![patient_email], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    let mut submissions = Vec::new();
    for row in rows {
        let (id, date, symptoms, prediction, patient_email) = row?;
        submissions.push(Submission {
            id,
            date: parse_timestamp(&date)?,
            symptoms,
            prediction,
            patient_email,
        });
    }
    Ok(submissions)
}
