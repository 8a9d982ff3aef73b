// caral-client/tests/room_admin.rs
// Room deletion cascade and multipart table forms against the mock backend

mod common;

use caral_client::{ClientError, RoomAdmin, RoomDeletion};
use common::*;
use shared::models::{DiningTableForm, DiningTableQuery, RoomForm, TableStatus};

#[tokio::test]
async fn busy_table_blocks_room_deletion_before_any_delete() {
    let mut store = dining_room();
    store.tables.push(table(9, "9", 6, ROOM_ID, TableStatus::Occupied));
    let server = spawn(store).await;
    let gateway = staff(&server).await;
    server.clear_requests().await;

    let err = RoomAdmin::new(&gateway).delete_room(ROOM_ID).await.unwrap_err();
    match err {
        ClientError::RoomHasBusyTables { room_id, tables } => {
            assert_eq!(room_id, ROOM_ID);
            assert_eq!(tables, vec!["9".to_string()]);
        }
        other => panic!("expected RoomHasBusyTables, got {other:?}"),
    }
    assert_eq!(server.request_lines().await, vec!["GET /ajustes/mesas"]);
    assert_eq!(server.state().store.lock().await.tables.len(), 3);
}

#[tokio::test]
async fn free_room_is_deleted_table_by_table_then_room() {
    let mut store = dining_room();
    store.create_room(&RoomForm::new("Terraza")).unwrap();
    store.tables.push(table(20, "T1", 2, 2, TableStatus::Free));
    let server = spawn(store).await;
    let gateway = staff(&server).await;
    server.clear_requests().await;

    let deletion = RoomAdmin::new(&gateway).delete_room(ROOM_ID).await.unwrap();
    assert_eq!(
        deletion,
        RoomDeletion {
            room_id: ROOM_ID,
            deleted_tables: vec![TABLE_ID, 8],
        }
    );
    assert_eq!(
        server.request_lines().await,
        vec![
            "GET /ajustes/mesas",
            "DELETE /ajustes/mesas/7",
            "DELETE /ajustes/mesas/8",
            "DELETE /ajustes/salones/1",
        ]
    );

    let overview = RoomAdmin::new(&gateway).overview().await.unwrap();
    assert_eq!(overview.len(), 1);
    assert_eq!(overview[0].room.description, "Terraza");
    assert_eq!(overview[0].tables.len(), 1);
}

#[tokio::test]
async fn failing_table_halts_the_cascade_and_keeps_the_room() {
    let server = spawn(dining_room()).await;
    server.fail_table_delete(8).await;
    let gateway = staff(&server).await;

    let err = RoomAdmin::new(&gateway).delete_room(ROOM_ID).await.unwrap_err();
    match &err {
        ClientError::CascadeHalted { table, deleted, .. } => {
            assert_eq!(table, "8");
            assert_eq!(deleted, &vec![TABLE_ID]);
        }
        other => panic!("expected CascadeHalted, got {other:?}"),
    }
    assert!(!err.is_unauthorized());

    let lines = server.request_lines().await;
    assert!(!lines.contains(&"DELETE /ajustes/salones/1".to_string()));
    assert_eq!(gateway.list_rooms().await.unwrap().len(), 1);
}

#[tokio::test]
async fn table_forms_travel_as_multipart_with_put_override() {
    let server = spawn(dining_room()).await;
    let gateway = staff(&server).await;
    let admin = RoomAdmin::new(&gateway);

    let form = DiningTableForm::new("12", 6, ROOM_ID).with_image("mesa12.png", vec![0x89, 0x50, 0x4e, 0x47]);
    let created = admin.create_table(&form).await.unwrap();
    assert_eq!(created.number, "12");
    assert_eq!(created.capacity, 6);
    assert!(created.status.is_free());
    assert_eq!(
        server.state().store.lock().await.table_images.get(&created.id).map(String::as_str),
        Some("mesa12.png")
    );

    let update = DiningTableForm::new("12", 8, ROOM_ID).with_status(TableStatus::Reserved);
    let updated = admin.update_table(created.id, &update).await.unwrap();
    assert_eq!(updated.capacity, 8);
    assert_eq!(updated.status, TableStatus::Reserved);

    let last = server.requests().await.pop().unwrap();
    assert_eq!(last.method, "POST");
    assert_eq!(last.method_override.as_deref(), Some("PUT"));
    assert_eq!(last.path, format!("/ajustes/mesas/{}", created.id));

    let roomy = admin
        .tables(&DiningTableQuery {
            capacity: Some(5),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(roomy.iter().map(|t| t.id).collect::<Vec<_>>(), vec![created.id]);
}

#[tokio::test]
async fn table_with_active_reservation_reports_a_readable_error() {
    let server = spawn(dining_room()).await;
    let gateway = staff(&server).await;
    let payload = shared::models::ReservationCreate {
        client_id: caral_mock::state::CUSTOMER_ID,
        window: shared::models::ReservationWindow::span(at(13), at(14)),
        table_ids: vec![TABLE_ID],
        party_size: 2,
        notes: String::new(),
    };
    gateway.create_reservation(&payload).await.unwrap();

    let err = RoomAdmin::new(&gateway).delete_table(TABLE_ID).await.unwrap_err();
    match err {
        ClientError::Domain { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "This table or room cannot be changed while it has active reservations");
        }
        other => panic!("expected Domain, got {other:?}"),
    }
}
