//! Per-session actor context.
//!
//! Every operation that depends on who is acting receives a `SessionContext`
//! explicitly. Nothing about the current user lives in process-wide state.

use serde::{Deserialize, Serialize};

use crate::error::PortalError;
use crate::models::enums::UserRole;
use crate::models::{ChatRequest, User};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

impl SessionContext {
    pub fn for_user(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn require_role(&self, role: UserRole) -> Result<(), PortalError> {
        if self.role == role {
            Ok(())
        } else {
            Err(PortalError::Forbidden(format!(
                "{} is signed in as {}, this action needs {}",
                self.email, self.role, role
            )))
        }
    }

    pub fn require_admin(&self) -> Result<(), PortalError> {
        self.require_role(UserRole::Admin)
    }

    /// True when this actor is the request's patient or doctor.
    pub fn is_participant(&self, request: &ChatRequest) -> bool {
        self.email == request.patient_email || self.email == request.doctor_email
    }

    /// Participants may always see a request; admins may see every request.
    pub fn require_visible(&self, request: &ChatRequest) -> Result<(), PortalError> {
        if self.is_admin() || self.is_participant(request) {
            Ok(())
        } else {
            Err(PortalError::Forbidden(format!(
                "{} is not a participant of chat request {}",
                self.email, request.request_id
            )))
        }
    }
}
