//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Token resolver: `Authorization: Bearer` → `SessionContext`
//! 2. Access logger: logs after auth, has the actor's email

pub mod audit;
pub mod auth;
