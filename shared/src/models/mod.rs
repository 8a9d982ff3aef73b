//! Data models
//!
//! Shared between caral-client and caral-mock. Field names on the wire are the
//! backend's (Spanish) names; Rust field names are English.
//! All IDs are `i64`.

pub mod availability;
pub mod customer;
pub mod dining_table;
pub mod reservation;
pub mod room;

// Re-exports
pub use availability::*;
pub use customer::*;
pub use dining_table::*;
pub use reservation::*;
pub use room::*;
