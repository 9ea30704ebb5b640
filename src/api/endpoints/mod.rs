//! API endpoint handlers.
//!
//! Handlers are thin: they resolve the caller's scope from `SessionContext`
//! and delegate to the domain modules.

pub mod auth;
pub mod feedback;
pub mod health;
pub mod messages;
pub mod notifications;
pub mod requests;
pub mod symptoms;
pub mod users;
