use serde::{Deserialize, Serialize};

use super::enums::RequestStatus;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ChatRequestFilter {
    pub patient_email: Option<String>,
    pub doctor_email: Option<String>,
    pub status: Option<RequestStatus>,
    pub specialty: Option<String>,
}

impl ChatRequestFilter {
    /// Requests still waiting on the given doctor.
    pub fn pending_for_doctor(doctor_email: &str) -> Self {
        Self {
            doctor_email: Some(doctor_email.to_string()),
            status: Some(RequestStatus::Pending),
            ..Self::default()
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct DoctorFilter {
    pub specialty: Option<String>,
}
