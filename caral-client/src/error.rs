//! Client error types
//!
//! Every gateway and view operation resolves to normalized data or to one of
//! these errors. Display strings are the user-facing messages.

use shared::models::ReservationStatus;
use thiserror::Error;

/// Substrings the backend uses when the reservation/table join rejects a write
const JOIN_TABLE_MARKERS: [&str; 2] = ["reserva_mesas", "reserva_mesa"];

/// Substrings the backend uses when active reservations block a change
const ACTIVE_RESERVATION_MARKERS: [&str; 2] = ["reservas activas", "active reservations"];

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Rejected locally before any network call
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No session is active; the request was not sent
    #[error("You are not logged in")]
    NoSession,

    /// HTTP 401
    #[error("Session expired, please log in again")]
    Unauthorized,

    /// HTTP 403
    #[error("You are not authorized to perform this action")]
    Forbidden,

    /// Login or registration rejected
    #[error("{0}")]
    Auth(String),

    /// Non-2xx response carrying a server message
    #[error("{message}")]
    Domain { status: u16, message: String },

    /// Non-2xx response without a recognizable body
    #[error("Server error ({status})")]
    Status { status: u16 },

    /// No HTTP response at all
    #[error("Network error, check your connection")]
    Transport(#[from] reqwest::Error),

    /// Response body in an unexpected shape
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    /// Room deletion refused because some of its tables are in use
    #[error("Room {room_id} cannot be deleted: tables {} are not free", .tables.join(", "))]
    RoomHasBusyTables { room_id: i64, tables: Vec<String> },

    /// Room deletion stopped at a table that could not be deleted
    #[error("Could not delete table {table} of room {room_id}: {source}")]
    CascadeHalted {
        room_id: i64,
        table: String,
        /// Tables deleted before the failure, in order
        deleted: Vec<i64>,
        #[source]
        source: Box<ClientError>,
    },
}

impl ClientError {
    /// Build a domain error from a server message, rewriting known causes.
    pub fn domain(status: u16, message: &str) -> Self {
        Self::Domain {
            status,
            message: recognize_server_message(message),
        }
    }

    /// True when the caller should treat the identity as gone.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Self::Unauthorized | Self::NoSession => true,
            Self::CascadeHalted { source, .. } => source.is_unauthorized(),
            _ => false,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Rewrite backend messages whose raw text is not useful to end users.
pub fn recognize_server_message(message: &str) -> String {
    let lowered = message.to_lowercase();
    if JOIN_TABLE_MARKERS.iter().any(|m| lowered.contains(m)) {
        "Database constraint error on the reservation/table relation; contact the system administrator"
            .to_string()
    } else if ACTIVE_RESERVATION_MARKERS.iter().any(|m| lowered.contains(m)) {
        "This table or room cannot be changed while it has active reservations".to_string()
    } else {
        message.trim().to_string()
    }
}

/// Local validation failures, one per rule
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Select a date")]
    MissingDate,

    #[error("Enter the number of people")]
    MissingPartySize,

    #[error("The number of people must be between 1 and {max} (got {value})")]
    PartySizeOutOfRange { value: u32, max: u32 },

    #[error("Select a client")]
    MissingClient,

    #[error("The selected client is not valid")]
    InvalidClient,

    #[error("Select a start and end time")]
    MissingTimeWindow,

    #[error("The end time must be after the start time")]
    InvalidTimeWindow,

    #[error("The start time must be between 12:00 and 20:00 (got {start})")]
    OutsideServiceHours { start: String },

    #[error("The reservation cannot end after 20:00 (ends {end})")]
    EndsAfterClosing { end: String },

    #[error("The number of people must be a positive integer")]
    InvalidPartySize,

    #[error("Select at least one table")]
    NoTablesSelected,

    #[error(
        "The selected tables seat {capacity} people, fewer than the party of {party_size}"
    )]
    InsufficientCapacity { capacity: u32, party_size: u32 },

    #[error("A reservation cannot go from {from} to {to}")]
    InvalidTransition {
        from: ReservationStatus,
        to: ReservationStatus,
    },

    #[error("Invalid reservation id {0}")]
    InvalidReservationId(i64),

    #[error("Reservation {0} is annulled; no actions are available")]
    ReservationLocked(i64),

    #[error("Reservation {0} is not in the current list")]
    UnknownReservation(i64),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Table capacity must be a positive integer")]
    InvalidCapacity,
}
