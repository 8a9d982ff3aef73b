//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Dining table entity (mesa)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiningTable {
    #[serde(rename = "id_mesa", deserialize_with = "crate::util::lenient_int::deserialize")]
    pub id: i64,
    #[serde(
        rename = "numero_mesa",
        alias = "nro_mesa",
        with = "crate::util::string_or_number"
    )]
    pub number: String,
    #[serde(rename = "capacidad", deserialize_with = "crate::util::lenient_int::deserialize")]
    pub capacity: u32,
    #[serde(rename = "id_salon", deserialize_with = "crate::util::lenient_int::deserialize")]
    pub room_id: i64,
    #[serde(rename = "estado", default)]
    pub status: TableStatus,
}

impl DiningTable {
    /// Human-readable label, falling back to the id when no number is set.
    pub fn label(&self) -> String {
        if self.number.trim().is_empty() {
            format!("#{}", self.id)
        } else {
            self.number.clone()
        }
    }
}

/// Table occupancy status
///
/// The backend owns this vocabulary; values other than the three known ones
/// are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TableStatus {
    #[default]
    Free,
    Occupied,
    Reserved,
    Other(String),
}

impl TableStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Free => "libre",
            Self::Occupied => "ocupada",
            Self::Reserved => "reservada",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self, Self::Free)
    }
}

impl From<String> for TableStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "libre" | "free" | "disponible" => Self::Free,
            "ocupada" | "ocupado" | "occupied" => Self::Occupied,
            "reservada" | "reservado" | "reserved" => Self::Reserved,
            _ => Self::Other(raw),
        }
    }
}

impl From<TableStatus> for String {
    fn from(status: TableStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for TableStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File attached to a table form (photo of the table)
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Create / update dining table payload
///
/// Sent as multipart form data, so it is not `Serialize`; see [`Self::fields`].
#[derive(Debug, Clone, PartialEq)]
pub struct DiningTableForm {
    pub number: String,
    pub capacity: u32,
    pub room_id: i64,
    pub status: Option<TableStatus>,
    pub image: Option<Attachment>,
}

impl DiningTableForm {
    pub fn new(number: impl Into<String>, capacity: u32, room_id: i64) -> Self {
        Self {
            number: number.into(),
            capacity,
            room_id,
            status: None,
            image: None,
        }
    }

    pub fn with_status(mut self, status: TableStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_image(mut self, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.image = Some(Attachment {
            file_name: file_name.into(),
            bytes,
        });
        self
    }

    /// Text parts of the multipart body, in wire field names.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("numero_mesa", self.number.clone()),
            ("capacidad", self.capacity.to_string()),
            ("id_salon", self.room_id.to_string()),
        ];
        if let Some(status) = &self.status {
            fields.push(("estado", status.as_str().to_string()));
        }
        fields
    }
}

/// Query filters for the table listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiningTableQuery {
    pub date: Option<chrono::NaiveDate>,
    pub capacity: Option<u32>,
}

impl DiningTableQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(date) = self.date {
            pairs.push(("fecha", date.format(crate::util::DATE_FORMAT).to_string()));
        }
        if let Some(capacity) = self.capacity {
            pairs.push(("capacidad", capacity.to_string()));
        }
        pairs
    }
}
