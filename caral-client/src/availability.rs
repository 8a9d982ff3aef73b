//! Availability search
//!
//! Holds the search parameters, the last applied result and the table
//! selection. Every search is tagged with a generation number; a response for
//! anything but the newest generation is discarded, so a slow earlier search
//! can never overwrite a newer one. Changing the date, party size or client
//! starts a new generation and clears the selection.

use crate::api::ApiGateway;
use crate::error::ValidationError;
use crate::http::HttpClient;
use crate::ClientResult;
use chrono::{Duration, NaiveDate, NaiveTime};
use shared::models::{AvailabilityRequest, AvailabilityResult, DiningTable, ReservationWindow};
use std::collections::BTreeSet;

/// Largest party size accepted by the search
pub const MAX_PARTY_SIZE: u32 = 50;

/// Window length in minutes derived from a lone start time
pub const DEFAULT_SLOT_MINUTES: i64 = 60;

pub const NO_TABLES_NOTICE: &str = "No tables available for the selected date and time";

/// Identifies one issued search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket(u64);

/// What a finished search did to the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Candidates replaced; carries how many
    Applied(usize),
    /// Applied, but nothing is free; show [`NO_TABLES_NOTICE`]
    NoTables,
    /// A newer search was issued meanwhile; nothing changed
    Superseded,
}

#[derive(Debug, Clone, Default)]
pub struct AvailabilitySearch {
    date: Option<NaiveDate>,
    start_time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
    party_size: Option<u32>,
    client_id: Option<i64>,
    generation: u64,
    result: Option<AvailabilityResult>,
    selection: BTreeSet<i64>,
}

impl AvailabilitySearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn party_size(&self) -> Option<u32> {
        self.party_size
    }

    pub fn client_id(&self) -> Option<i64> {
        self.client_id
    }

    pub fn set_date(&mut self, date: Option<NaiveDate>) {
        if self.date != date {
            self.date = date;
            self.invalidate();
        }
    }

    pub fn set_party_size(&mut self, party_size: Option<u32>) {
        if self.party_size != party_size {
            self.party_size = party_size;
            self.invalidate();
        }
    }

    /// Staff flows book on behalf of a chosen client.
    pub fn set_client(&mut self, client_id: Option<i64>) {
        if self.client_id != client_id {
            self.client_id = client_id;
            self.invalidate();
        }
    }

    /// Explicit start and end times.
    pub fn set_window(&mut self, start: NaiveTime, end: NaiveTime) {
        self.start_time = Some(start);
        self.end_time = Some(end);
    }

    /// Start time only; the end is [`DEFAULT_SLOT_MINUTES`] later.
    pub fn set_start(&mut self, start: NaiveTime) {
        self.start_time = Some(start);
        self.end_time = None;
    }

    /// Start and end of the requested window, deriving the end when unset.
    pub fn times(&self) -> Result<(NaiveTime, NaiveTime), ValidationError> {
        let start = self.start_time.ok_or(ValidationError::MissingTimeWindow)?;
        let end = match self.end_time {
            Some(end) => end,
            None => {
                let (end, wrapped) = start.overflowing_add_signed(Duration::minutes(DEFAULT_SLOT_MINUTES));
                if wrapped != 0 {
                    return Err(ValidationError::InvalidTimeWindow);
                }
                end
            }
        };
        if end <= start {
            return Err(ValidationError::InvalidTimeWindow);
        }
        Ok((start, end))
    }

    /// Validated backend query for the current parameters.
    pub fn request(&self) -> Result<AvailabilityRequest, ValidationError> {
        let date = self.date.ok_or(ValidationError::MissingDate)?;
        let party_size = self.party_size.ok_or(ValidationError::MissingPartySize)?;
        if party_size == 0 || party_size > MAX_PARTY_SIZE {
            return Err(ValidationError::PartySizeOutOfRange {
                value: party_size,
                max: MAX_PARTY_SIZE,
            });
        }
        let (start_time, end_time) = self.times()?;
        Ok(AvailabilityRequest {
            date,
            start_time,
            end_time,
            party_size: Some(party_size),
        })
    }

    /// The searched window as a reservation window, once a date and time are set.
    pub fn window(&self) -> Option<ReservationWindow> {
        let date = self.date?;
        let (start, end) = self.times().ok()?;
        Some(ReservationWindow::span(date.and_time(start), date.and_time(end)))
    }

    /// Validate and issue a new search; any earlier ticket becomes stale.
    pub fn begin(&mut self) -> Result<(SearchTicket, AvailabilityRequest), ValidationError> {
        let request = self.request()?;
        self.generation += 1;
        Ok((SearchTicket(self.generation), request))
    }

    /// Apply the response for `ticket` unless a newer search was issued.
    pub fn complete(&mut self, ticket: SearchTicket, result: AvailabilityResult) -> SearchOutcome {
        if ticket.0 != self.generation {
            tracing::debug!(
                ticket = ticket.0,
                current = self.generation,
                "Discarding out-of-order availability response"
            );
            return SearchOutcome::Superseded;
        }
        let available: BTreeSet<i64> = result.available.iter().map(|t| t.id).collect();
        self.selection.retain(|id| available.contains(id));
        let count = result.available.len();
        self.result = Some(result);
        if count == 0 {
            SearchOutcome::NoTables
        } else {
            SearchOutcome::Applied(count)
        }
    }

    /// Run one search end to end.
    ///
    /// Validation failures return before any network call.
    pub async fn search<C: HttpClient>(&mut self, gateway: &ApiGateway<C>) -> ClientResult<SearchOutcome> {
        let (ticket, request) = self.begin()?;
        let result = gateway.check_availability(&request).await?;
        Ok(self.complete(ticket, result))
    }

    /// Free tables from the last applied search.
    pub fn candidates(&self) -> &[DiningTable] {
        self.result
            .as_ref()
            .map(|r| r.available.as_slice())
            .unwrap_or_default()
    }

    pub fn occupied(&self) -> &[DiningTable] {
        self.result
            .as_ref()
            .map(|r| r.occupied.as_slice())
            .unwrap_or_default()
    }

    /// Shown instead of an error when the last search found nothing.
    pub fn notice(&self) -> Option<&'static str> {
        match &self.result {
            Some(result) if result.available.is_empty() => Some(NO_TABLES_NOTICE),
            _ => None,
        }
    }

    /// Add or remove a candidate from the selection. Returns whether it is
    /// selected afterwards; ids that are not candidates are ignored.
    pub fn toggle(&mut self, table_id: i64) -> bool {
        if !self.candidates().iter().any(|t| t.id == table_id) {
            return false;
        }
        if self.selection.remove(&table_id) {
            false
        } else {
            self.selection.insert(table_id);
            true
        }
    }

    pub fn is_selected(&self, table_id: i64) -> bool {
        self.selection.contains(&table_id)
    }

    pub fn selected_ids(&self) -> Vec<i64> {
        self.selection.iter().copied().collect()
    }

    pub fn selected_tables(&self) -> Vec<DiningTable> {
        self.candidates()
            .iter()
            .filter(|t| self.selection.contains(&t.id))
            .cloned()
            .collect()
    }

    pub fn selected_capacity(&self) -> u32 {
        self.selected_tables().iter().map(|t| t.capacity).sum()
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        self.result = None;
        self.selection.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::*;
    use crate::ClientError;
    use serde_json::json;
    use shared::models::TableStatus;

    fn table(id: i64, capacity: u32) -> DiningTable {
        DiningTable {
            id,
            number: id.to_string(),
            capacity,
            room_id: 1,
            status: TableStatus::Free,
        }
    }

    fn result(tables: Vec<DiningTable>) -> AvailabilityResult {
        AvailabilityResult {
            total_available: tables.len(),
            available: tables,
            ..Default::default()
        }
    }

    fn ready() -> AvailabilitySearch {
        let mut search = AvailabilitySearch::new();
        search.set_date(NaiveDate::from_ymd_opt(2025, 7, 27));
        search.set_party_size(Some(4));
        search.set_start(NaiveTime::from_hms_opt(13, 0, 0).unwrap());
        search
    }

    #[tokio::test]
    async fn missing_date_or_party_size_makes_no_call() {
        let gateway = staff_gateway();

        let mut search = ready();
        search.set_date(None);
        let err = search.search(&gateway).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(ValidationError::MissingDate)));

        let mut search = ready();
        search.set_party_size(None);
        let err = search.search(&gateway).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(ValidationError::MissingPartySize)));

        let mut search = ready();
        search.set_party_size(Some(51));
        assert!(search.search(&gateway).await.is_err());

        assert!(gateway.transport().calls().is_empty());
    }

    #[test]
    fn lone_start_time_derives_one_hour_window() {
        let request = ready().request().unwrap();
        assert_eq!(request.end_time, NaiveTime::from_hms_opt(14, 0, 0).unwrap());

        let mut late = ready();
        late.set_start(NaiveTime::from_hms_opt(23, 30, 0).unwrap());
        assert_eq!(late.request(), Err(ValidationError::InvalidTimeWindow));
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut search = ready();
        let (first, _) = search.begin().unwrap();
        let (second, _) = search.begin().unwrap();

        assert_eq!(search.complete(second, result(vec![table(7, 4)])), SearchOutcome::Applied(1));
        assert_eq!(
            search.complete(first, result(vec![table(1, 2), table(2, 2)])),
            SearchOutcome::Superseded
        );
        assert_eq!(search.candidates().len(), 1);
        assert_eq!(search.candidates()[0].id, 7);
    }

    #[test]
    fn toggle_selection_and_clear_on_parameter_change() {
        let mut search = ready();
        let (ticket, _) = search.begin().unwrap();
        search.complete(ticket, result(vec![table(7, 4), table(8, 2)]));

        assert!(search.toggle(7));
        assert!(search.toggle(8));
        assert!(!search.toggle(8));
        assert!(!search.toggle(99));
        assert_eq!(search.selected_ids(), vec![7]);
        assert_eq!(search.selected_capacity(), 4);

        search.set_party_size(Some(4));
        assert_eq!(search.selected_ids(), vec![7]);

        search.set_client(Some(42));
        assert!(search.selected_ids().is_empty());
        assert!(search.candidates().is_empty());
    }

    #[test]
    fn in_flight_search_is_dropped_when_date_changes() {
        let mut search = ready();
        let (ticket, _) = search.begin().unwrap();
        search.set_date(NaiveDate::from_ymd_opt(2025, 7, 28));
        assert_eq!(search.complete(ticket, result(vec![table(7, 4)])), SearchOutcome::Superseded);
    }

    #[tokio::test]
    async fn empty_result_is_a_notice_not_an_error() {
        let gateway = staff_gateway();
        gateway.transport().reply(json!({"success": true, "data": {
            "mesas_disponibles": [], "mesas_ocupadas": [], "total_disponibles": 0, "total_ocupadas": 0
        }}));
        let mut search = ready();
        assert_eq!(search.search(&gateway).await.unwrap(), SearchOutcome::NoTables);
        assert_eq!(search.notice(), Some(NO_TABLES_NOTICE));
    }
}
