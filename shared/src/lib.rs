//! Shared types for the Caral reservation client
//!
//! Wire models for rooms, tables, reservations and auth, the backend's
//! response envelope, and serde helpers for its loosely typed fields.
//! Used by both `caral-client` and `caral-mock`.

pub mod client;
pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
