//! Reservation Model

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::str::FromStr;

use crate::util::{self, DATE_FORMAT};

// =============================================================================
// Status
// =============================================================================

/// Reservation lifecycle status (estado)
///
/// ```text
/// pending ──► confirmed ──► completed
///    │            │
///    ├──► cancelled ◄──┤
///    └──► annulled  ◄──┘
/// ```
///
/// Cancelled, completed and annulled are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum ReservationStatus {
    #[default]
    #[serde(rename = "pendiente", alias = "Pendiente", alias = "pending")]
    Pending,
    #[serde(rename = "confirmada", alias = "Confirmada", alias = "confirmed")]
    Confirmed,
    #[serde(rename = "cancelada", alias = "Cancelada", alias = "cancelled")]
    Cancelled,
    #[serde(rename = "completada", alias = "Completada", alias = "completed")]
    Completed,
    #[serde(rename = "anulada", alias = "Anulada", alias = "annulled")]
    Annulled,
}

impl ReservationStatus {
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Confirmed,
        Self::Cancelled,
        Self::Completed,
        Self::Annulled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pendiente",
            Self::Confirmed => "confirmada",
            Self::Cancelled => "cancelada",
            Self::Completed => "completada",
            Self::Annulled => "anulada",
        }
    }

    /// Statuses reachable from this one in a single step.
    pub fn transitions(&self) -> &'static [ReservationStatus] {
        match self {
            Self::Pending => &[Self::Confirmed, Self::Cancelled, Self::Annulled],
            Self::Confirmed => &[Self::Completed, Self::Cancelled, Self::Annulled],
            Self::Cancelled | Self::Completed | Self::Annulled => &[],
        }
    }

    pub fn can_transition_to(&self, target: ReservationStatus) -> bool {
        self.transitions().contains(&target)
    }

    pub fn is_terminal(&self) -> bool {
        self.transitions().is_empty()
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pendiente" | "pending" => Ok(Self::Pending),
            "confirmada" | "confirmed" => Ok(Self::Confirmed),
            "cancelada" | "cancelled" => Ok(Self::Cancelled),
            "completada" | "completed" => Ok(Self::Completed),
            "anulada" | "annulled" => Ok(Self::Annulled),
            other => Err(format!("unknown reservation status: {other}")),
        }
    }
}

// =============================================================================
// Time window
// =============================================================================

/// When a reservation takes place
///
/// Current backends use a datetime span; older records carry a date plus two
/// times of day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReservationWindow {
    Span {
        #[serde(rename = "fecha_inicio", with = "crate::util::datetime")]
        start: NaiveDateTime,
        #[serde(rename = "fecha_fin", with = "crate::util::datetime")]
        end: NaiveDateTime,
    },
    Legacy {
        #[serde(rename = "fecha_reserva", with = "crate::util::date")]
        date: NaiveDate,
        #[serde(rename = "hora_inicio", with = "crate::util::time_of_day")]
        start_time: NaiveTime,
        #[serde(rename = "hora_fin", with = "crate::util::time_of_day")]
        end_time: NaiveTime,
    },
}

impl ReservationWindow {
    pub fn span(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self::Span { start, end }
    }

    pub fn start(&self) -> NaiveDateTime {
        match self {
            Self::Span { start, .. } => *start,
            Self::Legacy {
                date, start_time, ..
            } => date.and_time(*start_time),
        }
    }

    pub fn end(&self) -> NaiveDateTime {
        match self {
            Self::Span { end, .. } => *end,
            Self::Legacy { date, end_time, .. } => date.and_time(*end_time),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.start().date()
    }

    /// Half-open overlap test.
    pub fn overlaps(&self, other: &ReservationWindow) -> bool {
        self.start() < other.end() && other.start() < self.end()
    }
}

// =============================================================================
// Reservation
// =============================================================================

/// Table assigned to a reservation, as the backend reports it
///
/// Listings embed table objects; create payloads echo bare ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableRef {
    Id(#[serde(deserialize_with = "crate::util::lenient_int::deserialize")] i64),
    Summary(TableSummary),
}

impl TableRef {
    pub fn id(&self) -> i64 {
        match self {
            Self::Id(id) => *id,
            Self::Summary(summary) => summary.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSummary {
    #[serde(rename = "id_mesa", deserialize_with = "crate::util::lenient_int::deserialize")]
    pub id: i64,
    #[serde(
        rename = "numero_mesa",
        alias = "nro_mesa",
        default,
        deserialize_with = "crate::util::opt_string_or_number::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub number: Option<String>,
    #[serde(
        rename = "capacidad",
        default,
        deserialize_with = "crate::util::opt_lenient_int::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub capacity: Option<u32>,
}

/// Reservation entity (reserva)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    #[serde(rename = "id_reserva", deserialize_with = "crate::util::lenient_int::deserialize")]
    pub id: i64,
    #[serde(
        rename = "id_cliente",
        default,
        deserialize_with = "crate::util::opt_lenient_int::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub client_id: Option<i64>,
    #[serde(flatten)]
    pub window: ReservationWindow,
    #[serde(rename = "numero_personas", deserialize_with = "crate::util::lenient_int::deserialize")]
    pub party_size: u32,
    #[serde(rename = "mesas", alias = "id_mesas", default)]
    pub tables: Vec<TableRef>,
    #[serde(rename = "estado", default)]
    pub status: ReservationStatus,
    #[serde(rename = "observaciones", default)]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
}

impl Reservation {
    /// Soft-deleted reservations keep their row but carry a deletion marker.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at
            .as_deref()
            .is_some_and(|marker| !marker.trim().is_empty())
    }

    /// Status as presented to users: soft-deleted rows read as annulled.
    pub fn effective_status(&self) -> ReservationStatus {
        if self.is_deleted() {
            ReservationStatus::Annulled
        } else {
            self.status
        }
    }

    pub fn table_ids(&self) -> Vec<i64> {
        self.tables.iter().map(TableRef::id).collect()
    }

    pub fn date(&self) -> NaiveDate {
        self.window.date()
    }
}

// =============================================================================
// Payloads
// =============================================================================

/// Create reservation payload
///
/// The wire shape depends on the window: spans send `id_mesas`, legacy
/// windows send `mesas` plus an explicit initial `estado`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawReservationCreate")]
pub struct ReservationCreate {
    pub client_id: i64,
    pub window: ReservationWindow,
    pub table_ids: Vec<i64>,
    pub party_size: u32,
    pub notes: String,
}

impl Serialize for ReservationCreate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id_cliente", &self.client_id)?;
        match &self.window {
            ReservationWindow::Span { start, end } => {
                map.serialize_entry("fecha_inicio", &start.format(util::DATETIME_FORMAT).to_string())?;
                map.serialize_entry("fecha_fin", &end.format(util::DATETIME_FORMAT).to_string())?;
                map.serialize_entry("id_mesas", &self.table_ids)?;
            }
            ReservationWindow::Legacy {
                date,
                start_time,
                end_time,
            } => {
                map.serialize_entry("fecha_reserva", &date.format(DATE_FORMAT).to_string())?;
                map.serialize_entry("hora_inicio", &start_time.format(util::TIME_FORMAT).to_string())?;
                map.serialize_entry("hora_fin", &end_time.format(util::TIME_FORMAT).to_string())?;
                map.serialize_entry("estado", ReservationStatus::Pending.as_str())?;
                map.serialize_entry("mesas", &self.table_ids)?;
            }
        }
        map.serialize_entry("numero_personas", &self.party_size)?;
        map.serialize_entry("observaciones", &self.notes)?;
        map.end()
    }
}

#[derive(Deserialize)]
struct RawReservationCreate {
    #[serde(deserialize_with = "crate::util::lenient_int::deserialize")]
    id_cliente: i64,
    #[serde(flatten)]
    window: ReservationWindow,
    #[serde(alias = "mesas", default)]
    id_mesas: Vec<TableRef>,
    #[serde(deserialize_with = "crate::util::lenient_int::deserialize")]
    numero_personas: u32,
    #[serde(default)]
    observaciones: Option<String>,
}

impl From<RawReservationCreate> for ReservationCreate {
    fn from(raw: RawReservationCreate) -> Self {
        Self {
            client_id: raw.id_cliente,
            window: raw.window,
            table_ids: raw.id_mesas.iter().map(TableRef::id).collect(),
            party_size: raw.numero_personas,
            notes: raw.observaciones.unwrap_or_default(),
        }
    }
}

/// Generic (non-status) reservation update payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReservationUpdate {
    #[serde(flatten)]
    pub window: Option<ReservationWindow>,
    #[serde(rename = "numero_personas", default, skip_serializing_if = "Option::is_none")]
    pub party_size: Option<u32>,
    #[serde(rename = "id_mesas", default, skip_serializing_if = "Option::is_none")]
    pub table_ids: Option<Vec<i64>>,
    #[serde(rename = "observaciones", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Status change payload for `PATCH /reservas/{id}/cambiar-estado`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    #[serde(rename = "estado")]
    pub status: ReservationStatus,
    #[serde(rename = "observaciones", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Wire-level filters for `GET /reservas`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservationQuery {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub date: Option<NaiveDate>,
    pub status: Option<ReservationStatus>,
    pub client_id: Option<i64>,
    pub capacity: Option<u32>,
    pub table_number: Option<String>,
    pub historical: bool,
}

impl ReservationQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let fmt = |date: NaiveDate| date.format(DATE_FORMAT).to_string();
        if let Some(from) = self.date_from {
            pairs.push(("fecha_inicio", fmt(from)));
        }
        if let Some(to) = self.date_to {
            pairs.push(("fecha_fin", fmt(to)));
        }
        if let Some(date) = self.date {
            pairs.push(("fecha_reserva", fmt(date)));
        }
        if let Some(status) = self.status {
            pairs.push(("estado", status.as_str().to_string()));
        }
        if let Some(client_id) = self.client_id {
            pairs.push(("id_cliente", client_id.to_string()));
        }
        if let Some(capacity) = self.capacity {
            pairs.push(("capacidad", capacity.to_string()));
        }
        if let Some(number) = self.table_number.as_deref().map(str::trim) {
            if !number.is_empty() {
                pairs.push(("nro_mesa", number.to_string()));
            }
        }
        if self.historical {
            pairs.push(("historico", "true".to_string()));
        }
        pairs
    }
}
