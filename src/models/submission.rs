use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One symptom-checker interaction. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub date: NaiveDateTime,
    pub symptoms: String,
    pub prediction: String,
    pub patient_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSubmission {
    pub date: NaiveDateTime,
    pub symptoms: String,
    pub prediction: String,
    pub patient_email: String,
}
