//! Domain error taxonomy shared by every portal operation.

use thiserror::Error;

use crate::db::DatabaseError;
use crate::models::enums::RequestStatus;

#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Cannot {action} chat request {request_id} while it is {from}")]
    IllegalTransition {
        request_id: i64,
        from: RequestStatus,
        action: &'static str,
    },

    #[error("Not permitted: {0}")]
    Forbidden(String),

    #[error("Not authenticated: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<rusqlite::Error> for PortalError {
    fn from(err: rusqlite::Error) -> Self {
        PortalError::Database(DatabaseError::Sqlite(err))
    }
}

impl PortalError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        PortalError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// The one answer given for every failed sign-in, whatever the cause.
    pub fn invalid_credentials() -> Self {
        PortalError::Unauthorized("invalid credentials".into())
    }

    /// Lift a unique-key violation out of the database layer into a `Conflict`.
    pub fn conflict_or(err: DatabaseError, what: impl Into<String>) -> Self {
        match err {
            DatabaseError::UniqueViolation(_) => PortalError::Conflict(what.into()),
            other => PortalError::Database(other),
        }
    }
}
