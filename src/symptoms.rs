//! Symptom checker and the submissions log it writes to.

use rusqlite::Connection;

use crate::db;
use crate::error::PortalError;
use crate::models::{self, NewSubmission, Submission};

const ORTHOPEDICS: &str = "Consult Orthopedics";
const GENERAL_PHYSICIAN: &str = "Consult General Physician";

/// Keyword triage. Knee complaints go to orthopedics, everything else to a GP.
pub fn predict(symptoms: &str) -> &'static str {
    if symptoms.to_lowercase().contains("knee") {
        ORTHOPEDICS
    } else {
        GENERAL_PHYSICIAN
    }
}

/// Run the checker for a patient and log the interaction.
pub fn check_symptoms(
    conn: &Connection,
    patient_email: &str,
    symptoms: &str,
) -> Result<Submission, PortalError> {
    let submission = NewSubmission {
        date: models::now(),
        symptoms: symptoms.trim().to_string(),
        prediction: predict(symptoms).to_string(),
        patient_email: patient_email.trim().to_string(),
    };
    add_submission(conn, &submission)
}

pub fn add_submission(conn: &Connection, submission: &NewSubmission) -> Result<Submission, PortalError> {
    if submission.patient_email.trim().is_empty() {
        return Err(PortalError::Validation("submission needs a patient email".into()));
    }
    if submission.symptoms.trim().is_empty() {
        return Err(PortalError::Validation("please describe your symptoms".into()));
    }

    let stored = db::insert_submission(conn, submission)?;
    tracing::info!(
        submission_id = stored.id,
        patient = %stored.patient_email,
        prediction = %stored.prediction,
        "Symptom submission recorded"
    );
    Ok(stored)
}

/// Every submission, or one patient's when `patient_email` is given.
pub fn list_submissions(
    conn: &Connection,
    patient_email: Option<&str>,
) -> Result<Vec<Submission>, PortalError> {
    Ok(db::get_submissions(conn, patient_email)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn knee_goes_to_orthopedics() {
        assert_eq!(predict("Severe pain in right KNEE after a fall"), ORTHOPEDICS);
        assert_eq!(predict("Headache and mild fever"), GENERAL_PHYSICIAN);
    }

    #[test]
    fn check_records_submission() {
        let conn = open_memory_database().unwrap();
        let sub = check_symptoms(&conn, "p@x.com", "  my knee hurts ").unwrap();
        assert_eq!(sub.symptoms, "my knee hurts");
        assert_eq!(sub.prediction, ORTHOPEDICS);

        let all = list_submissions(&conn, None).unwrap();
        assert_eq!(all, vec![sub]);
    }

    #[test]
    fn blank_symptoms_are_rejected() {
        let conn = open_memory_database().unwrap();
        assert!(matches!(
            check_symptoms(&conn, "p@x.com", "   "),
            Err(PortalError::Validation(_))
        ));
        assert!(list_submissions(&conn, None).unwrap().is_empty());
    }

    #[test]
    fn list_filters_by_patient() {
        let conn = open_memory_database().unwrap();
        check_symptoms(&conn, "a@x.com", "cough").unwrap();
        check_symptoms(&conn, "b@x.com", "knee swelling").unwrap();
        check_symptoms(&conn, "a@x.com", "sore throat").unwrap();

        let mine = list_submissions(&conn, Some("a@x.com")).unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine[0].id < mine[1].id);
        assert!(mine.iter().all(|s| s.patient_email == "a@x.com"));
    }
}
