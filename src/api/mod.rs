//! JSON HTTP surface over the portal's domain operations.
//!
//! Actors sign in with a password and then send the issued bearer token on
//! every request; the session middleware resolves it into a `SessionContext`
//! that handlers pass down. Store work runs on the blocking thread pool.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::portal_router;
pub use server::{start_server, PortalServer};
