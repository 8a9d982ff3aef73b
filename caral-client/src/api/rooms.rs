//! Rooms (salones) and the room deletion cascade

use super::ApiGateway;
use crate::envelope::{self, RECORD_SHAPES};
use crate::http::{ApiRequest, HttpClient};
use crate::{ClientError, ClientResult};
use shared::models::{DiningTable, DiningTableQuery, Room, RoomForm, RoomWithTables};

/// Outcome of a completed room deletion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomDeletion {
    pub room_id: i64,
    /// Tables deleted before the room, in deletion order
    pub deleted_tables: Vec<i64>,
}

impl<C: HttpClient> ApiGateway<C> {
    pub async fn list_rooms(&self) -> ClientResult<Vec<Room>> {
        let body = self.send(ApiRequest::get("/ajustes/salones")).await?;
        envelope::decode(&body, &envelope::list_shapes("salones"))
    }

    pub async fn create_room(&self, form: &RoomForm) -> ClientResult<Room> {
        let body = self
            .send(ApiRequest::post("/ajustes/salones").json(form)?)
            .await?;
        envelope::decode(&body, &RECORD_SHAPES)
    }

    pub async fn update_room(&self, room_id: i64, form: &RoomForm) -> ClientResult<Room> {
        let body = self
            .send(ApiRequest::put(format!("/ajustes/salones/{room_id}")).json(form)?)
            .await?;
        envelope::decode(&body, &RECORD_SHAPES)
    }

    /// Delete a room together with its tables.
    ///
    /// Refuses without deleting anything when any of the room's tables is not
    /// free. Otherwise deletes the tables one at a time and then the room. The
    /// first failing table stops the sequence; nothing is rolled back.
    pub async fn delete_room(&self, room_id: i64) -> ClientResult<RoomDeletion> {
        let tables: Vec<DiningTable> = self
            .list_tables(&DiningTableQuery::default())
            .await?
            .into_iter()
            .filter(|table| table.room_id == room_id)
            .collect();

        let busy: Vec<String> = tables
            .iter()
            .filter(|table| !table.status.is_free())
            .map(DiningTable::label)
            .collect();
        if !busy.is_empty() {
            tracing::warn!(room_id, busy = ?busy, "Room has tables in use, not deleting");
            return Err(ClientError::RoomHasBusyTables {
                room_id,
                tables: busy,
            });
        }

        let mut deleted = Vec::with_capacity(tables.len());
        for table in &tables {
            if let Err(source) = self.delete_table(table.id).await {
                tracing::warn!(room_id, table_id = table.id, "Room deletion halted: {}", source);
                return Err(ClientError::CascadeHalted {
                    room_id,
                    table: table.label(),
                    deleted,
                    source: Box::new(source),
                });
            }
            tracing::info!(room_id, table_id = table.id, "Deleted table of room");
            deleted.push(table.id);
        }

        self.send(ApiRequest::delete(format!("/ajustes/salones/{room_id}")))
            .await?;
        tracing::info!(room_id, tables = deleted.len(), "Deleted room");
        Ok(RoomDeletion {
            room_id,
            deleted_tables: deleted,
        })
    }

    /// Rooms with their tables grouped under them.
    pub async fn rooms_with_tables(&self) -> ClientResult<Vec<RoomWithTables>> {
        let rooms = self.list_rooms().await?;
        let tables = self.list_tables(&DiningTableQuery::default()).await?;
        Ok(RoomWithTables::group(rooms, &tables))
    }
}

#[cfg(test)]
mod tests {
    use crate::ClientError;
    use crate::api::testing::*;
    use serde_json::json;

    fn table(id: i64, room: i64, status: &str) -> serde_json::Value {
        json!({"id_mesa": id, "numero_mesa": format!("M{id}"), "capacidad": 4, "id_salon": room, "estado": status})
    }

    #[tokio::test]
    async fn busy_table_blocks_room_deletion_without_deletes() {
        let gateway = staff_gateway();
        gateway.transport().reply(json!({"data": [
            table(1, 2, "libre"),
            table(2, 2, "ocupada"),
            table(3, 5, "ocupada"),
        ]}));

        let err = gateway.delete_room(2).await.unwrap_err();
        match &err {
            ClientError::RoomHasBusyTables { room_id, tables } => {
                assert_eq!(*room_id, 2);
                assert_eq!(tables, &vec!["M2".to_string()]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(gateway.transport().trace(), vec!["GET /ajustes/mesas"]);
    }

    #[tokio::test]
    async fn free_tables_are_deleted_before_room() {
        let gateway = staff_gateway();
        gateway
            .transport()
            .reply(json!([table(1, 2, "libre"), table(4, 2, "libre"), table(9, 3, "reservada")]))
            .reply(json!({"success": true}))
            .reply(json!({"success": true}))
            .reply(json!({"success": true}));

        let outcome = gateway.delete_room(2).await.unwrap();
        assert_eq!(outcome.deleted_tables, vec![1, 4]);
        assert_eq!(
            gateway.transport().trace(),
            vec![
                "GET /ajustes/mesas",
                "DELETE /ajustes/mesas/1",
                "DELETE /ajustes/mesas/4",
                "DELETE /ajustes/salones/2",
            ]
        );
    }

    #[tokio::test]
    async fn failing_table_halts_cascade_and_names_it() {
        let gateway = staff_gateway();
        gateway
            .transport()
            .reply(json!({"mesas": [table(1, 2, "libre"), table(4, 2, "libre"), table(6, 2, "libre")]}))
            .reply(json!({"success": true}))
            .fail(ClientError::domain(422, "La mesa tiene reservas activas"));

        let err = gateway.delete_room(2).await.unwrap_err();
        match &err {
            ClientError::CascadeHalted { table, deleted, .. } => {
                assert_eq!(table, "M4");
                assert_eq!(deleted, &vec![1]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(err.to_string().contains("active reservations"));
        assert_eq!(gateway.transport().calls().len(), 3);
    }

    #[tokio::test]
    async fn rooms_with_tables_groups_by_owner() {
        let gateway = staff_gateway();
        gateway
            .transport()
            .reply(json!({"salones": [
                {"id_salon": 1, "descripcion": "Terraza", "estado": "activo"},
                {"id_salon": 2, "descripcion": "Interior", "estado": "inactivo"}
            ]}))
            .reply(json!({"data": [table(1, 2, "libre"), table(2, 2, "libre"), table(3, 1, "libre")]}));

        let overview = gateway.rooms_with_tables().await.unwrap();
        assert_eq!(overview[0].tables.len(), 1);
        assert_eq!(overview[1].seats(), 8);
    }
}
