//! Caral Client - web client core for the Caral Sanguchería reservation backend
//!
//! Session handling, the API gateway, availability search, the reservation
//! composer, the reservation lifecycle view and room/table administration.

pub mod admin;
pub mod api;
pub mod availability;
pub mod composer;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod session;

pub use admin::RoomAdmin;
pub use api::{ApiGateway, RoomDeletion};
pub use availability::{AvailabilitySearch, SearchOutcome, SearchTicket};
pub use composer::{ComposerMode, ComposerOutcome, ReservationComposer, ReservationDraft};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, ValidationError};
pub use http::{HttpClient, NetworkHttpClient};
pub use lifecycle::{
    DeleteConfirmation, ListScope, ReservationAction, ReservationFilters, ReservationListView,
};
pub use session::{Session, SessionStore};

// Re-export shared types for convenience
pub use shared::client::{LoginResponse, RegisterRequest, UserInfo, UserRole};
pub use shared::models;
