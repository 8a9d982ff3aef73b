//! Reservation list and lifecycle actions
//!
//! Local state changes only after the backend confirms them: a status change
//! replaces the row with the reservation the server returns, and deletions
//! and creations reload the list.

use crate::api::ApiGateway;
use crate::composer::{ComposerOutcome, ReservationComposer};
use crate::error::ValidationError;
use crate::http::HttpClient;
use crate::ClientResult;
use chrono::NaiveDate;
use shared::models::{Reservation, ReservationQuery, ReservationStatus, StatusChange};

/// Whose reservations the view lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    /// Staff: every client, filtered server-side
    All,
    /// The logged-in customer (`/mis-reservas`)
    Mine,
}

/// Filters chosen by the user; unset fields fall back to the view defaults
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservationFilters {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub status: Option<ReservationStatus>,
    pub client_id: Option<i64>,
    pub table_number: Option<String>,
    pub capacity: Option<u32>,
}

/// Action offered on one row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationAction {
    Edit,
    Delete,
    Transition(ReservationStatus),
}

/// Pending delete awaiting an explicit confirm or cancel
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a delete only happens through ReservationListView::confirm_delete"]
pub struct DeleteConfirmation {
    reservation_id: i64,
}

impl DeleteConfirmation {
    pub fn reservation_id(&self) -> i64 {
        self.reservation_id
    }

    /// Drop the request; nothing is sent.
    pub fn cancel(self) {
        tracing::debug!(reservation_id = self.reservation_id, "Delete cancelled");
    }
}

#[derive(Debug, Clone)]
pub struct ReservationListView {
    scope: ListScope,
    today: NaiveDate,
    historical: bool,
    pub filters: ReservationFilters,
    reservations: Vec<Reservation>,
}

impl ReservationListView {
    /// `today` anchors the default date filter.
    pub fn new(scope: ListScope, today: NaiveDate) -> Self {
        Self {
            scope,
            today,
            historical: false,
            filters: ReservationFilters::default(),
            reservations: Vec::new(),
        }
    }

    /// View anchored on the local calendar day.
    pub fn for_today(scope: ListScope) -> Self {
        Self::new(scope, chrono::Local::now().date_naive())
    }

    pub fn scope(&self) -> ListScope {
        self.scope
    }

    pub fn is_historical(&self) -> bool {
        self.historical
    }

    pub fn set_historical(&mut self, historical: bool) {
        self.historical = historical;
    }

    pub fn toggle_historical(&mut self) -> bool {
        self.historical = !self.historical;
        self.historical
    }

    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    pub fn get(&self, reservation_id: i64) -> Option<&Reservation> {
        self.reservations.iter().find(|r| r.id == reservation_id)
    }

    /// Backend query for the current filters and mode.
    ///
    /// Without a chosen date the normal view shows today and the historical
    /// view the full range. Without a chosen status the normal view shows
    /// pending only and the historical view every status.
    pub fn query(&self) -> ReservationQuery {
        let f = &self.filters;
        let mut query = ReservationQuery {
            status: f.status.or((!self.historical).then_some(ReservationStatus::Pending)),
            client_id: f.client_id,
            capacity: f.capacity,
            table_number: f.table_number.clone(),
            historical: self.historical,
            ..Default::default()
        };
        match (f.date_from, f.date_to) {
            (Some(from), Some(to)) => {
                query.date_from = Some(from);
                query.date_to = Some(to);
            }
            (Some(day), None) | (None, Some(day)) => query.date = Some(day),
            (None, None) if !self.historical => query.date = Some(self.today),
            (None, None) => {}
        }
        query
    }

    /// Reload the list from the backend.
    pub async fn refresh<C: HttpClient>(&mut self, gateway: &ApiGateway<C>) -> ClientResult<&[Reservation]> {
        let reservations = match self.scope {
            ListScope::All => gateway.list_reservations(&self.query()).await?,
            ListScope::Mine => gateway.my_reservations().await?,
        };
        tracing::debug!(count = reservations.len(), historical = self.historical, "Reservations loaded");
        self.reservations = reservations;
        Ok(&self.reservations)
    }

    /// Actions for a row. Soft-deleted reservations get none.
    pub fn actions(reservation: &Reservation) -> Vec<ReservationAction> {
        if reservation.is_deleted() {
            return Vec::new();
        }
        let mut actions = vec![ReservationAction::Edit];
        actions.extend(
            reservation
                .status
                .transitions()
                .iter()
                .map(|status| ReservationAction::Transition(*status)),
        );
        actions.push(ReservationAction::Delete);
        actions
    }

    fn find_active(&self, reservation_id: i64) -> Result<&Reservation, ValidationError> {
        if reservation_id <= 0 {
            return Err(ValidationError::InvalidReservationId(reservation_id));
        }
        let reservation = self
            .get(reservation_id)
            .ok_or(ValidationError::UnknownReservation(reservation_id))?;
        if reservation.is_deleted() {
            return Err(ValidationError::ReservationLocked(reservation_id));
        }
        Ok(reservation)
    }

    /// Open the composer in status-edit mode for a row.
    pub fn edit(&self, reservation_id: i64) -> Result<ReservationComposer, ValidationError> {
        let reservation = self.find_active(reservation_id)?;
        Ok(ReservationComposer::edit_status(reservation.clone()))
    }

    /// First step of a delete; see [`Self::confirm_delete`].
    pub fn request_delete(&self, reservation_id: i64) -> Result<DeleteConfirmation, ValidationError> {
        self.find_active(reservation_id)?;
        Ok(DeleteConfirmation { reservation_id })
    }

    /// Perform a confirmed delete and reload the list.
    pub async fn confirm_delete<C: HttpClient>(
        &mut self,
        confirmation: DeleteConfirmation,
        gateway: &ApiGateway<C>,
    ) -> ClientResult<()> {
        gateway.delete_reservation(confirmation.reservation_id).await?;
        self.refresh(gateway).await?;
        Ok(())
    }

    /// Quick status change from the list.
    pub async fn transition<C: HttpClient>(
        &mut self,
        reservation_id: i64,
        target: ReservationStatus,
        gateway: &ApiGateway<C>,
    ) -> ClientResult<&Reservation> {
        let current = self.find_active(reservation_id)?.status;
        if !current.can_transition_to(target) {
            return Err(ValidationError::InvalidTransition {
                from: current,
                to: target,
            }
            .into());
        }
        let change = StatusChange {
            status: target,
            notes: None,
        };
        let updated = gateway.change_reservation_status(reservation_id, &change).await?;
        self.replace(updated)
            .ok_or_else(|| ValidationError::UnknownReservation(reservation_id).into())
    }

    /// Apply a composer result: a new reservation reloads the list, a status
    /// change replaces its row, or reloads the list when the row is missing.
    pub async fn complete<C: HttpClient>(
        &mut self,
        outcome: ComposerOutcome,
        gateway: &ApiGateway<C>,
    ) -> ClientResult<()> {
        match outcome {
            ComposerOutcome::Created(_) => {
                self.refresh(gateway).await?;
            }
            ComposerOutcome::StatusChanged(reservation) => {
                if self.replace(reservation).is_none() {
                    self.refresh(gateway).await?;
                }
            }
        }
        Ok(())
    }

    /// Swap a listed row for its updated copy; unlisted ids are left out.
    fn replace(&mut self, reservation: Reservation) -> Option<&Reservation> {
        let index = self.reservations.iter().position(|r| r.id == reservation.id)?;
        self.reservations[index] = reservation;
        Some(&self.reservations[index])
    }
}
