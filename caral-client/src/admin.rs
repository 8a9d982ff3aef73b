//! Room and table administration (staff only)

use crate::api::{ApiGateway, RoomDeletion};
use crate::error::ValidationError;
use crate::http::HttpClient;
use crate::{ClientError, ClientResult};
use shared::models::{
    DiningTable, DiningTableForm, DiningTableQuery, Room, RoomForm, RoomWithTables,
};

/// Staff-gated CRUD over rooms and tables
///
/// Non-staff sessions get [`ClientError::Forbidden`] and anonymous callers
/// [`ClientError::NoSession`], both without a network call.
#[derive(Debug)]
pub struct RoomAdmin<'a, C: HttpClient> {
    gateway: &'a ApiGateway<C>,
}

impl<'a, C: HttpClient> RoomAdmin<'a, C> {
    pub fn new(gateway: &'a ApiGateway<C>) -> Self {
        Self { gateway }
    }

    fn ensure_staff(&self) -> ClientResult<()> {
        match self.gateway.session().current() {
            None => Err(ClientError::NoSession),
            Some(session) if !session.is_staff() => Err(ClientError::Forbidden),
            Some(_) => Ok(()),
        }
    }

    pub async fn overview(&self) -> ClientResult<Vec<RoomWithTables>> {
        self.ensure_staff()?;
        self.gateway.rooms_with_tables().await
    }

    pub async fn rooms(&self) -> ClientResult<Vec<Room>> {
        self.ensure_staff()?;
        self.gateway.list_rooms().await
    }

    pub async fn create_room(&self, form: &RoomForm) -> ClientResult<Room> {
        self.ensure_staff()?;
        validate_room(form)?;
        self.gateway.create_room(form).await
    }

    pub async fn update_room(&self, room_id: i64, form: &RoomForm) -> ClientResult<Room> {
        self.ensure_staff()?;
        validate_room(form)?;
        self.gateway.update_room(room_id, form).await
    }

    /// Delete a room and its (free) tables.
    pub async fn delete_room(&self, room_id: i64) -> ClientResult<RoomDeletion> {
        self.ensure_staff()?;
        self.gateway.delete_room(room_id).await
    }

    pub async fn tables(&self, query: &DiningTableQuery) -> ClientResult<Vec<DiningTable>> {
        self.ensure_staff()?;
        self.gateway.list_tables(query).await
    }

    pub async fn create_table(&self, form: &DiningTableForm) -> ClientResult<DiningTable> {
        self.ensure_staff()?;
        validate_table(form)?;
        self.gateway.create_table(form).await
    }

    pub async fn update_table(&self, table_id: i64, form: &DiningTableForm) -> ClientResult<DiningTable> {
        self.ensure_staff()?;
        validate_table(form)?;
        self.gateway.update_table(table_id, form).await
    }

    pub async fn delete_table(&self, table_id: i64) -> ClientResult<()> {
        self.ensure_staff()?;
        self.gateway.delete_table(table_id).await
    }
}

fn validate_room(form: &RoomForm) -> Result<(), ValidationError> {
    if form.description.trim().is_empty() {
        return Err(ValidationError::MissingField("description"));
    }
    Ok(())
}

fn validate_table(form: &DiningTableForm) -> Result<(), ValidationError> {
    if form.number.trim().is_empty() {
        return Err(ValidationError::MissingField("table number"));
    }
    if form.capacity == 0 {
        return Err(ValidationError::InvalidCapacity);
    }
    if form.room_id <= 0 {
        return Err(ValidationError::MissingField("room"));
    }
    Ok(())
}
