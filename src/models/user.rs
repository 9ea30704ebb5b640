use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::UserRole;
use crate::error::PortalError;

/// An account. Patients, doctors and admins share one table and differ only by `role`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub role: UserRole,
    pub name: String,
    pub mobile: Option<String>,
    pub specialty: Option<String>,
    pub doc_id: Option<String>,
    pub qualification: Option<String>,
}

impl User {
    pub fn patient(email: &str, name: &str, mobile: Option<&str>) -> Self {
        Self {
            email: email.trim().to_string(),
            role: UserRole::Patient,
            name: name.trim().to_string(),
            mobile: mobile.map(str::trim).filter(|m| !m.is_empty()).map(str::to_string),
            specialty: None,
            doc_id: None,
            qualification: None,
        }
    }

    pub fn admin(email: &str, name: &str) -> Self {
        Self {
            email: email.trim().to_string(),
            role: UserRole::Admin,
            name: name.trim().to_string(),
            mobile: None,
            specialty: None,
            doc_id: None,
            qualification: None,
        }
    }

    pub fn is_doctor(&self) -> bool {
        self.role == UserRole::Doctor
    }

    /// Patient identifier snapshotted onto chat requests: "P" + last six mobile
    /// characters, taken as stored.
    pub fn patient_code(&self) -> String {
        match self.mobile.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            Some(mobile) => {
                let start = mobile.chars().count().saturating_sub(6);
                let tail: String = mobile.chars().skip(start).collect();
                format!("P{tail}")
            }
            None => "P000".to_string(),
        }
    }

    /// Checks the fields every account needs before it reaches the store.
    pub fn validate(&self) -> Result<(), PortalError> {
        validate_email(&self.email)?;
        if self.name.trim().is_empty() {
            return Err(PortalError::Validation("name is required".into()));
        }
        if let Some(ref mobile) = self.mobile {
            validate_mobile(mobile)?;
        }
        if self.is_doctor() {
            let missing = [
                ("specialty", &self.specialty),
                ("doc_id", &self.doc_id),
                ("qualification", &self.qualification),
            ]
            .into_iter()
            .find(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()));
            if let Some((field, _)) = missing {
                return Err(PortalError::Validation(format!("doctor {field} is required")));
            }
        }
        Ok(())
    }
}

/// Admin input for registering a doctor. Every field is mandatory.
#[derive(Clone, Serialize, Deserialize)]
pub struct NewDoctor {
    pub doc_id: String,
    pub name: String,
    pub email: String,
    pub specialty: String,
    pub qualification: String,
    pub mobile: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl std::fmt::Debug for NewDoctor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewDoctor")
            .field("doc_id", &self.doc_id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("specialty", &self.specialty)
            .finish_non_exhaustive()
    }
}

impl NewDoctor {
    pub fn into_user(self) -> Result<User, PortalError> {
        let fields = [
            ("doc_id", &self.doc_id),
            ("name", &self.name),
            ("email", &self.email),
            ("specialty", &self.specialty),
            ("qualification", &self.qualification),
            ("mobile", &self.mobile),
            ("password", &self.password),
        ];
        if let Some((field, _)) = fields.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(PortalError::Validation(format!("{field} is required")));
        }

        let user = User {
            email: self.email.trim().to_string(),
            role: UserRole::Doctor,
            name: self.name.trim().to_string(),
            mobile: Some(self.mobile.trim().to_string()),
            specialty: Some(self.specialty.trim().to_string()),
            doc_id: Some(self.doc_id.trim().to_string()),
            qualification: Some(self.qualification.trim().to_string()),
        };
        user.validate()?;
        Ok(user)
    }
}

/// Mobile numbers are exactly ten ASCII digits.
pub(crate) fn validate_mobile(mobile: &str) -> Result<(), PortalError> {
    if mobile.len() == 10 && mobile.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(PortalError::Validation(format!(
            "mobile number must be exactly 10 digits: {mobile:?}"
        )))
    }
}

/// A live bearer-token session. Only the token's digest is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub token_hash: String,
    pub user_email: String,
    pub created_at: NaiveDateTime,
}

pub(crate) fn validate_email(email: &str) -> Result<(), PortalError> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(PortalError::Validation(format!("invalid email address: {email:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctor() -> NewDoctor {
        NewDoctor {
            doc_id: "101".into(),
            name: "Dr. Afzal".into(),
            email: "doctor@app.com".into(),
            specialty: "Cardiology".into(),
            qualification: "MD".into(),
            mobile: "7260023491".into(),
            password: "doctor".into(),
        }
    }

    #[test]
    fn patient_code_uses_last_six_mobile_digits() {
        let user = User::patient("p@x.com", "Pat", Some("5551234567"));
        assert_eq!(user.patient_code(), "P234567");
    }

    #[test]
    fn patient_code_defaults_without_mobile() {
        assert_eq!(User::patient("p@x.com", "Pat", None).patient_code(), "P000");
        assert_eq!(User::patient("p@x.com", "Pat", Some("  ")).patient_code(), "P000");
    }

    #[test]
    fn patient_code_takes_characters_as_stored() {
        // Rows written before mobile validation may hold separators or short numbers.
        let mut user = User::patient("p@x.com", "Pat", None);
        user.mobile = Some("555-123-4567".into());
        assert_eq!(user.patient_code(), "P3-4567");
        user.mobile = Some("123".into());
        assert_eq!(user.patient_code(), "P123");
    }

    #[test]
    fn blank_mobile_is_treated_as_absent() {
        let user = User::patient("p@x.com", "Pat", Some("   "));
        assert_eq!(user.mobile, None);
        assert!(user.validate().is_ok());
    }

    #[test]
    fn mobile_must_be_ten_digits() {
        for bad in ["abc", "555123456", "55512345678", "555-123-4567", "５５５１２３４５６７"] {
            let user = User::patient("p@x.com", "Pat", Some(bad));
            assert!(
                matches!(user.validate(), Err(PortalError::Validation(ref msg)) if msg.contains("10 digits")),
                "{bad:?} should be rejected"
            );
        }
        assert!(User::patient("p@x.com", "Pat", Some(" 5551234567 ")).validate().is_ok());
    }

    #[test]
    fn new_doctor_mobile_is_validated() {
        let mut input = doctor();
        input.mobile = "72600".into();
        assert!(matches!(input.into_user(), Err(PortalError::Validation(_))));
    }

    #[test]
    fn new_doctor_debug_hides_password() {
        let rendered = format!("{:?}", doctor());
        assert!(rendered.contains("Dr. Afzal"));
        assert!(!rendered.contains("\"doctor\""));
    }

    #[test]
    fn new_doctor_requires_every_field() {
        let mut input = doctor();
        input.qualification = " ".into();
        let err = input.into_user().unwrap_err();
        assert!(matches!(err, PortalError::Validation(msg) if msg.contains("qualification")));
    }

    #[test]
    fn new_doctor_becomes_doctor_account() {
        let user = doctor().into_user().unwrap();
        assert!(user.is_doctor());
        assert_eq!(user.doc_id.as_deref(), Some("101"));
    }

    #[test]
    fn email_validation() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@domain").is_err());
        assert!(validate_email("a@b@c").is_err());
    }

    #[test]
    fn blank_name_is_rejected() {
        let user = User::patient("p@x.com", "  ", None);
        assert!(user.validate().is_err());
    }
}
