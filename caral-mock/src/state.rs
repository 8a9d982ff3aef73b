//! In-memory backend store
//!
//! Holds users, sessions, rooms, tables and reservations, plus a log of every
//! request received so tests can assert call counts and ordering.

use crate::error::{MockError, MockResult};
use chrono::NaiveDate;
use serde::Deserialize;
use shared::client::{RegisterRequest, UserInfo, UserRole};
use shared::models::{
    AvailabilityRequest, AvailabilityResult, Customer, DiningTable, Reservation, ReservationCreate,
    ReservationStatus, ReservationUpdate, ReservationWindow, Room, RoomForm, StatusChange,
    TableRef, TableStatus, TableSummary,
};
use shared::util::DATETIME_FORMAT;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

/// Shared server state
#[derive(Debug)]
pub struct MockState {
    pub store: Mutex<Store>,
}

impl MockState {
    pub fn new(store: Store) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    pub fn seeded() -> Self {
        Self::new(Store::seeded())
    }
}

#[derive(Debug, Clone)]
pub struct MockUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub role: UserRole,
}

impl MockUser {
    pub fn info(&self) -> UserInfo {
        UserInfo {
            id: self.id,
            client_id: None,
            role: self.role.clone(),
            display_name: self.name.clone(),
            email: Some(self.email.clone()),
        }
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}

/// One received request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRecord {
    pub method: String,
    /// Path below the API prefix, e.g. `/reservas/5`
    pub path: String,
    pub method_override: Option<String>,
}

impl RequestRecord {
    /// Method the backend acted on.
    pub fn effective_method(&self) -> &str {
        self.method_override.as_deref().unwrap_or(&self.method)
    }

    /// `"METHOD /path"`
    pub fn line(&self) -> String {
        format!("{} {}", self.effective_method(), self.path)
    }
}

/// Table fields parsed from a multipart form; absent parts keep stored values.
#[derive(Debug, Clone, Default)]
pub struct TableInput {
    pub number: Option<String>,
    pub capacity: Option<u32>,
    pub room_id: Option<i64>,
    pub status: Option<TableStatus>,
    pub image: Option<String>,
}

/// Query string of `GET /reservas`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReservationFilter {
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_fin: Option<NaiveDate>,
    pub fecha_reserva: Option<NaiveDate>,
    pub estado: Option<ReservationStatus>,
    pub id_cliente: Option<i64>,
    pub capacidad: Option<u32>,
    pub nro_mesa: Option<String>,
    pub historico: Option<bool>,
}

impl ReservationFilter {
    /// Without `historico` only live reservations are listed, pending unless
    /// a status is given.
    fn matches(&self, reservation: &Reservation) -> bool {
        let historical = self.historico.unwrap_or(false);
        if !historical && reservation.is_deleted() {
            return false;
        }
        let status = self
            .estado
            .or((!historical).then_some(ReservationStatus::Pending));
        if status.is_some_and(|s| reservation.effective_status() != s) {
            return false;
        }
        let date = reservation.date();
        if self.fecha_reserva.is_some_and(|d| date != d)
            || self.fecha_inicio.is_some_and(|from| date < from)
            || self.fecha_fin.is_some_and(|to| date > to)
            || self.id_cliente.is_some_and(|c| reservation.client_id != Some(c))
        {
            return false;
        }
        let summaries: Vec<&TableSummary> = reservation
            .tables
            .iter()
            .filter_map(|t| match t {
                TableRef::Summary(summary) => Some(summary),
                TableRef::Id(_) => None,
            })
            .collect();
        if let Some(capacity) = self.capacidad {
            if !summaries.iter().any(|t| t.capacity.unwrap_or(0) >= capacity) {
                return false;
            }
        }
        if let Some(number) = self.nro_mesa.as_deref().map(str::trim) {
            if !number.is_empty() && !summaries.iter().any(|t| t.number.as_deref() == Some(number)) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Default)]
pub struct Store {
    pub users: Vec<MockUser>,
    pub tokens: HashMap<String, i64>,
    pub rooms: Vec<Room>,
    pub tables: Vec<DiningTable>,
    pub reservations: Vec<Reservation>,
    pub requests: Vec<RequestRecord>,
    /// Uploaded photo file name per table id
    pub table_images: HashMap<i64, String>,
    /// Table ids whose DELETE fails with a 500
    pub failing_table_deletes: HashSet<i64>,
    next_user: i64,
    next_room: i64,
    next_table: i64,
    next_reservation: i64,
    token_seq: u64,
}

pub const STAFF_EMAIL: &str = "admin@caral.pe";
pub const STAFF_PASSWORD: &str = "admin123";
pub const CUSTOMER_EMAIL: &str = "cliente@caral.pe";
pub const CUSTOMER_PASSWORD: &str = "cliente123";
pub const CUSTOMER_ID: i64 = 42;

impl Store {
    /// One staff account, one customer (id 42) and no rooms or tables.
    pub fn seeded() -> Self {
        Self {
            users: vec![
                MockUser {
                    id: 1,
                    name: "Administrador".into(),
                    email: STAFF_EMAIL.into(),
                    phone: "999000111".into(),
                    password: STAFF_PASSWORD.into(),
                    role: UserRole::Staff("admin".into()),
                },
                MockUser {
                    id: CUSTOMER_ID,
                    name: "Lucía Quispe".into(),
                    email: CUSTOMER_EMAIL.into(),
                    phone: "987654321".into(),
                    password: CUSTOMER_PASSWORD.into(),
                    role: UserRole::Customer,
                },
            ],
            next_user: CUSTOMER_ID + 1,
            next_room: 1,
            next_table: 1,
            next_reservation: 1,
            ..Default::default()
        }
    }

    // ========== Auth ==========

    pub fn user_for_token(&self, token: &str) -> Option<&MockUser> {
        let id = self.tokens.get(token)?;
        self.users.iter().find(|u| u.id == *id)
    }

    fn issue_token(&mut self, user_id: i64) -> String {
        self.token_seq += 1;
        let token = format!("mock-{}-{}", user_id, self.token_seq);
        self.tokens.insert(token.clone(), user_id);
        token
    }

    pub fn login(&mut self, email: &str, password: &str) -> MockResult<(String, UserInfo)> {
        let user = self
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()) && u.password == password)
            .map(MockUser::info)
            .ok_or_else(|| MockError::InvalidCredentials("Credenciales incorrectas".into()))?;
        let token = self.issue_token(user.id);
        Ok((token, user))
    }

    pub fn register(&mut self, req: &RegisterRequest) -> MockResult<(String, UserInfo)> {
        if req.name.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
            return Err(MockError::Unprocessable("Nombre, correo y contraseña son obligatorios".into()));
        }
        if self.users.iter().any(|u| u.email.eq_ignore_ascii_case(req.email.trim())) {
            return Err(MockError::Unprocessable("El correo ya está registrado".into()));
        }
        let user = MockUser {
            id: self.next_user,
            name: req.name.trim().to_string(),
            email: req.email.trim().to_string(),
            phone: req.telefono.clone(),
            password: req.password.clone(),
            role: UserRole::Customer,
        };
        self.next_user += 1;
        let info = user.info();
        self.users.push(user);
        let token = self.issue_token(info.id);
        Ok((token, info))
    }

    pub fn logout(&mut self, token: &str) {
        self.tokens.remove(token);
    }

    pub fn customers(&self) -> Vec<Customer> {
        self.users
            .iter()
            .filter(|u| !u.is_staff())
            .map(|u| Customer {
                id: u.id,
                name: u.name.clone(),
                email: Some(u.email.clone()),
                phone: Some(u.phone.clone()),
            })
            .collect()
    }

    // ========== Rooms ==========

    pub fn create_room(&mut self, form: &RoomForm) -> MockResult<Room> {
        if form.description.trim().is_empty() {
            return Err(MockError::Unprocessable("La descripción es obligatoria".into()));
        }
        let room = Room {
            id: self.next_room,
            description: form.description.trim().to_string(),
            status: form.status,
        };
        self.next_room += 1;
        self.rooms.push(room.clone());
        Ok(room)
    }

    pub fn update_room(&mut self, id: i64, form: &RoomForm) -> MockResult<Room> {
        let room = self
            .rooms
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| MockError::NotFound(format!("Salón {id} no encontrado")))?;
        room.description = form.description.trim().to_string();
        room.status = form.status;
        Ok(room.clone())
    }

    pub fn delete_room(&mut self, id: i64) -> MockResult<()> {
        if !self.rooms.iter().any(|r| r.id == id) {
            return Err(MockError::NotFound(format!("Salón {id} no encontrado")));
        }
        if self.tables.iter().any(|t| t.room_id == id) {
            return Err(MockError::Conflict("El salón tiene mesas asociadas".into()));
        }
        self.rooms.retain(|r| r.id != id);
        Ok(())
    }

    // ========== Tables ==========

    pub fn list_tables(&self, capacity: Option<u32>) -> Vec<DiningTable> {
        self.tables
            .iter()
            .filter(|t| capacity.is_none_or(|c| t.capacity >= c))
            .cloned()
            .collect()
    }

    fn check_table(&self, table: &DiningTable) -> MockResult<()> {
        if table.number.trim().is_empty() {
            return Err(MockError::Unprocessable("El número de mesa es obligatorio".into()));
        }
        if table.capacity == 0 {
            return Err(MockError::Unprocessable("La capacidad debe ser mayor a cero".into()));
        }
        if !self.rooms.iter().any(|r| r.id == table.room_id) {
            return Err(MockError::Unprocessable(format!("El salón {} no existe", table.room_id)));
        }
        Ok(())
    }

    pub fn create_table(&mut self, input: TableInput) -> MockResult<DiningTable> {
        let image = input.image;
        let table = DiningTable {
            id: self.next_table,
            number: input.number.unwrap_or_default(),
            capacity: input.capacity.unwrap_or(0),
            room_id: input.room_id.unwrap_or(0),
            status: input.status.unwrap_or_default(),
        };
        self.check_table(&table)?;
        self.next_table += 1;
        if let Some(image) = image {
            self.table_images.insert(table.id, image);
        }
        self.tables.push(table.clone());
        Ok(table)
    }

    pub fn update_table(&mut self, id: i64, input: TableInput) -> MockResult<DiningTable> {
        let mut table = self
            .tables
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| MockError::NotFound(format!("Mesa {id} no encontrada")))?;
        if let Some(number) = input.number {
            table.number = number;
        }
        if let Some(capacity) = input.capacity {
            table.capacity = capacity;
        }
        if let Some(room_id) = input.room_id {
            if room_id != table.room_id && self.has_active_reservations(id) {
                return Err(MockError::Unprocessable(
                    "No se puede mover la mesa porque tiene reservas activas".into(),
                ));
            }
            table.room_id = room_id;
        }
        if let Some(status) = input.status {
            table.status = status;
        }
        self.check_table(&table)?;
        if let Some(image) = input.image {
            self.table_images.insert(id, image);
        }
        if let Some(slot) = self.tables.iter_mut().find(|t| t.id == id) {
            *slot = table.clone();
        }
        Ok(table)
    }

    pub fn delete_table(&mut self, id: i64) -> MockResult<()> {
        if self.failing_table_deletes.contains(&id) {
            return Err(MockError::Internal(format!("Error al eliminar la mesa {id}")));
        }
        if !self.tables.iter().any(|t| t.id == id) {
            return Err(MockError::NotFound(format!("Mesa {id} no encontrada")));
        }
        if self.has_active_reservations(id) {
            return Err(MockError::Unprocessable(
                "No se puede eliminar la mesa porque tiene reservas activas".into(),
            ));
        }
        self.tables.retain(|t| t.id != id);
        self.table_images.remove(&id);
        Ok(())
    }

    // ========== Reservations ==========

    fn is_active(reservation: &Reservation) -> bool {
        !reservation.is_deleted()
            && matches!(
                reservation.status,
                ReservationStatus::Pending | ReservationStatus::Confirmed
            )
    }

    fn has_active_reservations(&self, table_id: i64) -> bool {
        self.reservations
            .iter()
            .any(|r| Self::is_active(r) && r.table_ids().contains(&table_id))
    }

    /// Tables held by active reservations overlapping `window`.
    fn busy_tables(&self, window: &ReservationWindow, exclude: Option<i64>) -> HashSet<i64> {
        self.reservations
            .iter()
            .filter(|r| Some(r.id) != exclude && Self::is_active(r) && r.window.overlaps(window))
            .flat_map(Reservation::table_ids)
            .collect()
    }

    pub fn availability(&self, req: &AvailabilityRequest) -> MockResult<AvailabilityResult> {
        if req.end_time <= req.start_time {
            return Err(MockError::Unprocessable("La hora de fin debe ser posterior a la de inicio".into()));
        }
        let window = ReservationWindow::span(req.date.and_time(req.start_time), req.date.and_time(req.end_time));
        let busy = self.busy_tables(&window, None);
        let party = req.party_size.unwrap_or(0);

        let occupied: Vec<DiningTable> = self
            .tables
            .iter()
            .filter(|t| busy.contains(&t.id) || !t.status.is_free())
            .cloned()
            .collect();
        let available: Vec<DiningTable> = self
            .tables
            .iter()
            .filter(|t| !busy.contains(&t.id) && t.status.is_free() && t.capacity >= party)
            .cloned()
            .collect();
        Ok(AvailabilityResult {
            total_available: available.len(),
            total_occupied: occupied.len(),
            available,
            occupied,
        })
    }

    fn summaries(&self, table_ids: &[i64]) -> MockResult<Vec<TableRef>> {
        table_ids
            .iter()
            .map(|id| {
                self.tables
                    .iter()
                    .find(|t| t.id == *id)
                    .map(|t| {
                        TableRef::Summary(TableSummary {
                            id: t.id,
                            number: Some(t.number.clone()),
                            capacity: Some(t.capacity),
                        })
                    })
                    .ok_or_else(|| MockError::Unprocessable(format!("La mesa {id} no existe")))
            })
            .collect()
    }

    fn check_booking(
        &self,
        window: &ReservationWindow,
        table_ids: &[i64],
        party_size: u32,
        exclude: Option<i64>,
    ) -> MockResult<Vec<TableRef>> {
        if table_ids.is_empty() {
            return Err(MockError::Unprocessable("Debe seleccionar al menos una mesa".into()));
        }
        if window.end() <= window.start() {
            return Err(MockError::Unprocessable("La hora de fin debe ser posterior a la de inicio".into()));
        }
        let tables = self.summaries(table_ids)?;
        let capacity: u32 = self
            .tables
            .iter()
            .filter(|t| table_ids.contains(&t.id))
            .map(|t| t.capacity)
            .sum();
        if capacity < party_size {
            return Err(MockError::Unprocessable(format!(
                "Capacidad insuficiente: {capacity} lugares para {party_size} personas"
            )));
        }
        let busy = self.busy_tables(window, exclude);
        let taken: Vec<String> = table_ids
            .iter()
            .filter(|id| busy.contains(id))
            .map(i64::to_string)
            .collect();
        if !taken.is_empty() {
            return Err(MockError::Unprocessable(format!(
                "Las mesas {} ya están reservadas en ese horario",
                taken.join(", ")
            )));
        }
        Ok(tables)
    }

    pub fn create_reservation(&mut self, user: &MockUser, payload: ReservationCreate) -> MockResult<Reservation> {
        if !user.is_staff() && payload.client_id != user.id {
            return Err(MockError::Forbidden);
        }
        if !self.users.iter().any(|u| u.id == payload.client_id) {
            return Err(MockError::Unprocessable(format!("El cliente {} no existe", payload.client_id)));
        }
        if payload.party_size == 0 {
            return Err(MockError::Unprocessable("El número de personas es obligatorio".into()));
        }
        let tables = self.check_booking(&payload.window, &payload.table_ids, payload.party_size, None)?;
        let reservation = Reservation {
            id: self.next_reservation,
            client_id: Some(payload.client_id),
            window: payload.window,
            party_size: payload.party_size,
            tables,
            status: ReservationStatus::Pending,
            notes: Some(payload.notes).filter(|n| !n.is_empty()),
            deleted_at: None,
        };
        self.next_reservation += 1;
        self.reservations.push(reservation.clone());
        Ok(reservation)
    }

    pub fn list_reservations(&self, filter: &ReservationFilter) -> Vec<Reservation> {
        self.reservations
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect()
    }

    pub fn reservations_of(&self, client_id: i64) -> Vec<Reservation> {
        self.reservations
            .iter()
            .filter(|r| r.client_id == Some(client_id))
            .cloned()
            .collect()
    }

    fn reservation_index(&self, id: i64) -> MockResult<usize> {
        self.reservations
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| MockError::NotFound(format!("Reserva {id} no encontrada")))
    }

    pub fn update_reservation(&mut self, id: i64, update: ReservationUpdate) -> MockResult<Reservation> {
        let index = self.reservation_index(id)?;
        let current = self.reservations[index].clone();
        if current.is_deleted() {
            return Err(MockError::Unprocessable("La reserva está anulada".into()));
        }
        let window = update.window.unwrap_or_else(|| current.window.clone());
        let party_size = update.party_size.unwrap_or(current.party_size);
        let table_ids = update.table_ids.unwrap_or_else(|| current.table_ids());
        let tables = self.check_booking(&window, &table_ids, party_size, Some(id))?;

        let reservation = &mut self.reservations[index];
        reservation.window = window;
        reservation.party_size = party_size;
        reservation.tables = tables;
        if let Some(notes) = update.notes {
            reservation.notes = Some(notes);
        }
        Ok(reservation.clone())
    }

    /// Setting the current status again only updates the notes.
    pub fn change_status(&mut self, id: i64, change: StatusChange) -> MockResult<Reservation> {
        let index = self.reservation_index(id)?;
        let reservation = &mut self.reservations[index];
        if reservation.is_deleted() {
            return Err(MockError::Unprocessable("La reserva está anulada".into()));
        }
        if reservation.status != change.status && !reservation.status.can_transition_to(change.status) {
            return Err(MockError::Unprocessable(format!(
                "No se puede cambiar el estado de {} a {}",
                reservation.status, change.status
            )));
        }
        reservation.status = change.status;
        if let Some(notes) = change.notes {
            reservation.notes = Some(notes);
        }
        Ok(reservation.clone())
    }

    /// Soft delete.
    pub fn delete_reservation(&mut self, id: i64) -> MockResult<()> {
        let index = self.reservation_index(id)?;
        let reservation = &mut self.reservations[index];
        if reservation.is_deleted() {
            return Err(MockError::NotFound(format!("Reserva {id} no encontrada")));
        }
        reservation.deleted_at = Some(
            chrono::Local::now()
                .naive_local()
                .format(DATETIME_FORMAT)
                .to_string(),
        );
        Ok(())
    }
}
