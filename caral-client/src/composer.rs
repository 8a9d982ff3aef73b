//! Reservation composer
//!
//! Create mode collects a full reservation and validates it before anything
//! is sent. Status-edit mode changes only the status and notes of an existing
//! reservation through the status-change endpoint.

use crate::api::ApiGateway;
use crate::availability::AvailabilitySearch;
use crate::error::ValidationError;
use crate::http::HttpClient;
use crate::session::Session;
use crate::ClientResult;
use chrono::{Duration, NaiveTime, Timelike};
use shared::models::{
    DiningTable, Reservation, ReservationCreate, ReservationStatus, ReservationWindow, StatusChange,
};

/// First hour a reservation may start
pub const OPENING_HOUR: u32 = 12;
/// Reservations must start before and end by this hour
pub const CLOSING_HOUR: u32 = 20;

/// Fields of a reservation being composed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservationDraft {
    pub client_id: Option<i64>,
    pub window: Option<ReservationWindow>,
    pub party_size: Option<u32>,
    pub tables: Vec<DiningTable>,
    pub notes: String,
}

impl ReservationDraft {
    /// Draft prefilled from a finished availability search.
    pub fn from_search(search: &AvailabilitySearch) -> Self {
        Self {
            client_id: search.client_id(),
            window: search.window(),
            party_size: search.party_size(),
            tables: search.selected_tables(),
            notes: String::new(),
        }
    }

    /// Customers book for themselves; staff pick the client later.
    pub fn for_session(session: &Session) -> Self {
        Self {
            client_id: (!session.is_staff()).then(|| session.user.booking_id()),
            ..Self::default()
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn capacity(&self) -> u32 {
        self.tables.iter().map(|t| t.capacity).sum()
    }

    /// Check every rule in order and build the create payload.
    pub fn validate(&self) -> Result<ReservationCreate, ValidationError> {
        let client_id = self.client_id.ok_or(ValidationError::MissingClient)?;
        if client_id <= 0 {
            return Err(ValidationError::InvalidClient);
        }

        let window = self.window.clone().ok_or(ValidationError::MissingTimeWindow)?;
        check_service_hours(&window)?;

        let party_size = self
            .party_size
            .filter(|n| *n > 0)
            .ok_or(ValidationError::InvalidPartySize)?;

        if self.tables.is_empty() {
            return Err(ValidationError::NoTablesSelected);
        }
        let capacity = self.capacity();
        if capacity < party_size {
            return Err(ValidationError::InsufficientCapacity {
                capacity,
                party_size,
            });
        }

        Ok(ReservationCreate {
            client_id,
            window,
            table_ids: self.tables.iter().map(|t| t.id).collect(),
            party_size,
            notes: self.notes.trim().to_string(),
        })
    }
}

/// Start in `[12:00, 20:00)`, end no later than 20:00 the same day, end after start.
fn check_service_hours(window: &ReservationWindow) -> Result<(), ValidationError> {
    let (start, end) = (window.start(), window.end());
    let hour = start.hour();
    if !(OPENING_HOUR..CLOSING_HOUR).contains(&hour) {
        return Err(ValidationError::OutsideServiceHours {
            start: start.format("%H:%M").to_string(),
        });
    }
    let closing = start.date().and_time(NaiveTime::MIN) + Duration::hours(i64::from(CLOSING_HOUR));
    if end > closing {
        return Err(ValidationError::EndsAfterClosing {
            end: end.format("%H:%M").to_string(),
        });
    }
    if end <= start {
        return Err(ValidationError::InvalidTimeWindow);
    }
    Ok(())
}

/// Status and notes of an existing reservation
#[derive(Debug, Clone, PartialEq)]
pub struct StatusDraft {
    pub reservation: Reservation,
    pub status: ReservationStatus,
    pub notes: String,
}

impl StatusDraft {
    /// Statuses the form may offer: the current one plus its transitions.
    pub fn options(&self) -> Vec<ReservationStatus> {
        let current = self.reservation.effective_status();
        std::iter::once(current)
            .chain(current.transitions().iter().copied())
            .collect()
    }

    pub fn validate(&self) -> Result<StatusChange, ValidationError> {
        let reservation = &self.reservation;
        if reservation.id <= 0 {
            return Err(ValidationError::InvalidReservationId(reservation.id));
        }
        if reservation.is_deleted() {
            return Err(ValidationError::ReservationLocked(reservation.id));
        }
        if !self.options().contains(&self.status) {
            return Err(ValidationError::InvalidTransition {
                from: reservation.effective_status(),
                to: self.status,
            });
        }
        let notes = self.notes.trim();
        Ok(StatusChange {
            status: self.status,
            notes: (!notes.is_empty()).then(|| notes.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ComposerMode {
    Create(ReservationDraft),
    StatusEdit(StatusDraft),
}

/// Result of a successful submission
#[derive(Debug, Clone, PartialEq)]
pub enum ComposerOutcome {
    /// Backend-assigned id of the new reservation
    Created(i64),
    /// Reservation as stored after the status change
    StatusChanged(Reservation),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReservationComposer {
    mode: ComposerMode,
}

impl ReservationComposer {
    pub fn create(draft: ReservationDraft) -> Self {
        Self {
            mode: ComposerMode::Create(draft),
        }
    }

    pub fn edit_status(reservation: Reservation) -> Self {
        let status = reservation.effective_status();
        let notes = reservation.notes.clone().unwrap_or_default();
        Self {
            mode: ComposerMode::StatusEdit(StatusDraft {
                reservation,
                status,
                notes,
            }),
        }
    }

    pub fn mode(&self) -> &ComposerMode {
        &self.mode
    }

    pub fn draft_mut(&mut self) -> Option<&mut ReservationDraft> {
        match &mut self.mode {
            ComposerMode::Create(draft) => Some(draft),
            ComposerMode::StatusEdit(_) => None,
        }
    }

    pub fn status_mut(&mut self) -> Option<&mut StatusDraft> {
        match &mut self.mode {
            ComposerMode::StatusEdit(draft) => Some(draft),
            ComposerMode::Create(_) => None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.mode {
            ComposerMode::Create(draft) => draft.validate().map(|_| ()),
            ComposerMode::StatusEdit(draft) => draft.validate().map(|_| ()),
        }
    }

    /// Validate, then submit. Nothing is sent when validation fails.
    pub async fn submit<C: HttpClient>(&self, gateway: &ApiGateway<C>) -> ClientResult<ComposerOutcome> {
        match &self.mode {
            ComposerMode::Create(draft) => {
                let payload = draft.validate()?;
                let id = gateway.create_reservation(&payload).await?;
                Ok(ComposerOutcome::Created(id))
            }
            ComposerMode::StatusEdit(draft) => {
                let change = draft.validate()?;
                let updated = gateway
                    .change_reservation_status(draft.reservation.id, &change)
                    .await?;
                Ok(ComposerOutcome::StatusChanged(updated))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::*;
    use crate::http::Body;
    use crate::ClientError;
    use chrono::{NaiveDate, NaiveDateTime};
    use serde_json::json;
    use shared::client::UserRole;
    use shared::models::TableStatus;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 27)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn table(id: i64, capacity: u32) -> DiningTable {
        DiningTable {
            id,
            number: id.to_string(),
            capacity,
            room_id: 1,
            status: TableStatus::Free,
        }
    }

    fn draft() -> ReservationDraft {
        ReservationDraft {
            client_id: Some(42),
            window: Some(ReservationWindow::span(at(13, 0), at(14, 0))),
            party_size: Some(2),
            tables: vec![table(7, 4)],
            notes: "window seat".into(),
        }
    }

    fn reservation(status: &str) -> Reservation {
        serde_json::from_value(json!({
            "id_reserva": 5, "id_cliente": 42,
            "fecha_inicio": "2025-07-27T13:00:00", "fecha_fin": "2025-07-27T14:00:00",
            "numero_personas": 2, "mesas": [7], "estado": status
        }))
        .unwrap()
    }

    #[test]
    fn rules_fail_in_order_with_specific_errors() {
        let cases: Vec<(ReservationDraft, ValidationError)> = vec![
            (
                ReservationDraft { client_id: None, ..draft() },
                ValidationError::MissingClient,
            ),
            (
                ReservationDraft { client_id: Some(0), ..draft() },
                ValidationError::InvalidClient,
            ),
            (
                ReservationDraft { window: None, ..draft() },
                ValidationError::MissingTimeWindow,
            ),
            (
                ReservationDraft { party_size: Some(0), ..draft() },
                ValidationError::InvalidPartySize,
            ),
            (
                ReservationDraft { tables: vec![], ..draft() },
                ValidationError::NoTablesSelected,
            ),
            (
                ReservationDraft { party_size: Some(6), ..draft() },
                ValidationError::InsufficientCapacity { capacity: 4, party_size: 6 },
            ),
        ];
        for (draft, expected) in cases {
            assert_eq!(draft.validate(), Err(expected));
        }
    }

    #[test]
    fn service_hours_are_enforced() {
        let window = |start, end| ReservationDraft {
            window: Some(ReservationWindow::span(start, end)),
            ..draft()
        };
        assert!(matches!(
            window(at(11, 59), at(13, 0)).validate(),
            Err(ValidationError::OutsideServiceHours { .. })
        ));
        assert!(matches!(
            window(at(20, 0), at(21, 0)).validate(),
            Err(ValidationError::OutsideServiceHours { .. })
        ));
        assert!(matches!(
            window(at(19, 30), at(20, 30)).validate(),
            Err(ValidationError::EndsAfterClosing { .. })
        ));
        assert_eq!(
            window(at(15, 0), at(14, 0)).validate(),
            Err(ValidationError::InvalidTimeWindow)
        );
        assert!(window(at(19, 0), at(20, 0)).validate().is_ok());
        assert!(window(at(12, 0), at(13, 0)).validate().is_ok());
    }

    #[test]
    fn customer_session_prefills_own_id() {
        let customer = Session::new("t", user(42, UserRole::Customer));
        assert_eq!(ReservationDraft::for_session(&customer).client_id, Some(42));

        let staff = Session::new("t", user(1, UserRole::Staff("admin".into())));
        assert_eq!(ReservationDraft::for_session(&staff).client_id, None);
    }

    #[tokio::test]
    async fn invalid_draft_is_never_sent() {
        let gateway = staff_gateway();
        let composer = ReservationComposer::create(ReservationDraft {
            party_size: Some(9),
            ..draft()
        });
        let err = composer.submit(&gateway).await.unwrap_err();
        assert!(err.to_string().contains('9') && err.to_string().contains('4'));
        assert!(gateway.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn create_returns_backend_id() {
        let gateway = staff_gateway();
        gateway
            .transport()
            .reply(json!({"success": true, "data": {"id_reserva": 31}}));
        let outcome = ReservationComposer::create(draft())
            .submit(&gateway)
            .await
            .unwrap();
        assert_eq!(outcome, ComposerOutcome::Created(31));

        let call = &gateway.transport().calls()[0];
        assert_eq!(call.path(), "/reservas");
        assert_eq!(
            call.request.body,
            Body::Json(json!({
                "id_cliente": 42,
                "fecha_inicio": "2025-07-27T13:00:00",
                "fecha_fin": "2025-07-27T14:00:00",
                "id_mesas": [7],
                "numero_personas": 2,
                "observaciones": "window seat"
            }))
        );
    }

    #[tokio::test]
    async fn status_edit_sends_only_status_and_notes() {
        let gateway = staff_gateway();
        gateway
            .transport()
            .reply(json!({"data": reservation("confirmada")}));

        let mut composer = ReservationComposer::edit_status(reservation("pendiente"));
        assert!(composer.draft_mut().is_none());
        let edit = composer.status_mut().unwrap();
        edit.status = ReservationStatus::Confirmed;
        edit.notes = " llegan tarde ".into();

        let outcome = composer.submit(&gateway).await.unwrap();
        assert!(matches!(outcome, ComposerOutcome::StatusChanged(r) if r.status == ReservationStatus::Confirmed));

        let call = &gateway.transport().calls()[0];
        assert_eq!(call.path(), "/reservas/5/cambiar-estado");
        assert_eq!(
            call.request.body,
            Body::Json(json!({"estado": "confirmada", "observaciones": "llegan tarde"}))
        );
    }

    #[tokio::test]
    async fn status_edit_rejects_illegal_transition() {
        let gateway = staff_gateway();
        let mut composer = ReservationComposer::edit_status(reservation("completada"));
        composer.status_mut().unwrap().status = ReservationStatus::Pending;
        let err = composer.submit(&gateway).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Validation(ValidationError::InvalidTransition { .. })
        ));
        assert!(gateway.transport().calls().is_empty());
    }
}
