//! Room Model

use serde::{Deserialize, Serialize};

use super::DiningTable;

/// Room entity (salón: a named dining area grouping tables)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    #[serde(rename = "id_salon", deserialize_with = "crate::util::lenient_int::deserialize")]
    pub id: i64,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "estado", default)]
    pub status: RoomStatus,
}

/// Room availability for service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoomStatus {
    #[default]
    #[serde(rename = "activo", alias = "Activo", alias = "active")]
    Active,
    #[serde(rename = "inactivo", alias = "Inactivo", alias = "inactive")]
    Inactive,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "activo",
            Self::Inactive => "inactivo",
        }
    }
}

/// Create / update room payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomForm {
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "estado", default)]
    pub status: RoomStatus,
}

impl RoomForm {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            status: RoomStatus::Active,
        }
    }

    pub fn with_status(mut self, status: RoomStatus) -> Self {
        self.status = status;
        self
    }
}

/// Room together with the tables it owns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomWithTables {
    #[serde(flatten)]
    pub room: Room,
    #[serde(rename = "mesas")]
    pub tables: Vec<DiningTable>,
}

impl RoomWithTables {
    /// Group `tables` under each room by owning room id.
    ///
    /// Tables whose room is not in `rooms` are dropped.
    pub fn group(rooms: Vec<Room>, tables: &[DiningTable]) -> Vec<Self> {
        rooms
            .into_iter()
            .map(|room| {
                let tables = tables
                    .iter()
                    .filter(|table| table.room_id == room.id)
                    .cloned()
                    .collect();
                Self { room, tables }
            })
            .collect()
    }

    /// Total seats across the room's tables.
    pub fn seats(&self) -> u32 {
        self.tables.iter().map(|table| table.capacity).sum()
    }
}
