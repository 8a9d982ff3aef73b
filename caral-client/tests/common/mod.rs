// caral-client/tests/common/mod.rs
// Shared setup: a mock backend with one room and a few tables

#![allow(dead_code)]

use caral_client::{ApiGateway, ClientConfig, SessionStore};
use caral_mock::state::{CUSTOMER_EMAIL, CUSTOMER_PASSWORD, STAFF_EMAIL, STAFF_PASSWORD};
use caral_mock::{MockServer, MockState, Store};
use chrono::{NaiveDate, NaiveDateTime};
use shared::models::{DiningTable, RoomForm, TableStatus};

pub const ROOM_ID: i64 = 1;
/// Free four-seat table in [`ROOM_ID`]
pub const TABLE_ID: i64 = 7;

pub fn table(id: i64, number: &str, capacity: u32, room_id: i64, status: TableStatus) -> DiningTable {
    DiningTable {
        id,
        number: number.to_string(),
        capacity,
        room_id,
        status,
    }
}

/// Seeded users plus room 1 holding tables 7 and 8, both free.
pub fn dining_room() -> Store {
    let mut store = Store::seeded();
    store.create_room(&RoomForm::new("Salón principal")).unwrap();
    store.tables.push(table(TABLE_ID, "7", 4, ROOM_ID, TableStatus::Free));
    store.tables.push(table(8, "8", 2, ROOM_ID, TableStatus::Free));
    store
}

/// Route client and mock logs to the test harness; `RUST_LOG` overrides.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "caral_client=debug,caral_mock=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

pub async fn spawn(store: Store) -> MockServer {
    init_tracing();
    MockServer::spawn_with(MockState::new(store)).await.unwrap()
}

pub fn gateway(server: &MockServer) -> ApiGateway {
    ApiGateway::new(&ClientConfig::new(server.base_url()), SessionStore::new()).unwrap()
}

pub async fn staff(server: &MockServer) -> ApiGateway {
    let gateway = gateway(server);
    gateway.login(STAFF_EMAIL, STAFF_PASSWORD).await.unwrap();
    gateway
}

pub async fn customer(server: &MockServer) -> ApiGateway {
    let gateway = gateway(server);
    gateway.login(CUSTOMER_EMAIL, CUSTOMER_PASSWORD).await.unwrap();
    gateway
}

pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 27).unwrap()
}

pub fn at(hour: u32) -> NaiveDateTime {
    day().and_hms_opt(hour, 0, 0).unwrap()
}
