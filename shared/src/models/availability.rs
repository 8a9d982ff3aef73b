//! Availability Model

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::DiningTable;

/// Availability query (`POST /mesas-disponibles`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRequest {
    #[serde(rename = "fecha_reserva", with = "crate::util::date")]
    pub date: NaiveDate,
    #[serde(rename = "hora_inicio", with = "crate::util::time_of_day")]
    pub start_time: NaiveTime,
    #[serde(rename = "hora_fin", with = "crate::util::time_of_day")]
    pub end_time: NaiveTime,
    #[serde(rename = "numero_personas", default, skip_serializing_if = "Option::is_none")]
    pub party_size: Option<u32>,
}

/// Free and busy tables for the requested window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityResult {
    #[serde(rename = "mesas_disponibles", default)]
    pub available: Vec<DiningTable>,
    #[serde(rename = "mesas_ocupadas", default)]
    pub occupied: Vec<DiningTable>,
    #[serde(rename = "total_disponibles", default)]
    pub total_available: usize,
    #[serde(rename = "total_ocupadas", default)]
    pub total_occupied: usize,
}
