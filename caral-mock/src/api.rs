//! HTTP surface of the mock backend
//!
//! Mirrors the reservation backend's routes under `/api/web`, its bearer-token
//! auth and its response envelopes, including the table endpoints that only
//! return `{mesas: [...]}`.

use crate::error::{MockError, MockResult};
use crate::state::{MockState, MockUser, RequestRecord, ReservationFilter, Store, TableInput};
use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, Request, State},
    http::{HeaderMap, header},
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post, put},
};
use serde::Deserialize;
use serde_json::{Value, json};
use shared::client::{LoginRequest, RegisterRequest};
use shared::models::{
    AvailabilityRequest, ReservationCreate, ReservationUpdate, RoomForm, StatusChange, TableStatus,
};
use shared::response::ApiResponse;
use std::sync::Arc;

/// Path prefix every route lives under
pub const API_PREFIX: &str = "/api/web";

/// Header carrying the logical method of a multipart POST
pub const METHOD_OVERRIDE_HEADER: &str = "x-http-method-override";

type Shared = Arc<MockState>;

fn ok<T: serde::Serialize>(data: T, message: &str) -> MockResult<Json<Value>> {
    serde_json::to_value(ApiResponse::ok_with_message(data, message))
        .map(Json)
        .map_err(|e| MockError::Internal(e.to_string()))
}

// ========== Auth helpers ==========

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn caller(store: &Store, headers: &HeaderMap) -> MockResult<MockUser> {
    bearer(headers)
        .and_then(|token| store.user_for_token(token))
        .cloned()
        .ok_or(MockError::Unauthenticated)
}

fn staff(store: &Store, headers: &HeaderMap) -> MockResult<MockUser> {
    let user = caller(store, headers)?;
    if user.is_staff() {
        Ok(user)
    } else {
        Err(MockError::Forbidden)
    }
}

/// Staff, or the customer the reservation belongs to.
fn owner_or_staff(store: &Store, headers: &HeaderMap, reservation_id: i64) -> MockResult<MockUser> {
    let user = caller(store, headers)?;
    let owns = store
        .reservations
        .iter()
        .any(|r| r.id == reservation_id && r.client_id == Some(user.id));
    if user.is_staff() || owns {
        Ok(user)
    } else {
        Err(MockError::Forbidden)
    }
}

// ========== Request log ==========

async fn record(State(state): State<Shared>, req: Request, next: Next) -> Response {
    let raw = req.uri().path();
    let entry = RequestRecord {
        method: req.method().to_string(),
        path: raw.strip_prefix(API_PREFIX).unwrap_or(raw).to_string(),
        method_override: req
            .headers()
            .get(METHOD_OVERRIDE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_uppercase),
    };
    tracing::debug!(request = %entry.line(), "Mock request");
    state.store.lock().await.requests.push(entry);
    next.run(req).await
}

// ========== Auth ==========

async fn login(State(state): State<Shared>, Json(req): Json<LoginRequest>) -> MockResult<Json<Value>> {
    let (token, user) = state.store.lock().await.login(&req.email, &req.password)?;
    tracing::info!(user_id = user.id, "Mock login");
    Ok(Json(json!({
        "success": true,
        "message": "Inicio de sesión exitoso",
        "token": token,
        "user": user,
    })))
}

async fn register(
    State(state): State<Shared>,
    Json(req): Json<RegisterRequest>,
) -> MockResult<Json<Value>> {
    let (token, user) = state.store.lock().await.register(&req)?;
    Ok(Json(json!({
        "success": true,
        "message": "Usuario registrado",
        "token": token,
        "usuario": user,
    })))
}

async fn logout(State(state): State<Shared>, headers: HeaderMap) -> MockResult<Json<Value>> {
    let mut store = state.store.lock().await;
    caller(&store, &headers)?;
    if let Some(token) = bearer(&headers) {
        store.logout(token);
    }
    Ok(Json(json!({"success": true, "message": "Sesión cerrada"})))
}

// ========== Rooms ==========

async fn list_rooms(State(state): State<Shared>, headers: HeaderMap) -> MockResult<Json<Value>> {
    let store = state.store.lock().await;
    staff(&store, &headers)?;
    ok(&store.rooms, "Salones")
}

async fn create_room(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(form): Json<RoomForm>,
) -> MockResult<Json<Value>> {
    let mut store = state.store.lock().await;
    staff(&store, &headers)?;
    ok(store.create_room(&form)?, "Salón creado")
}

async fn update_room(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(form): Json<RoomForm>,
) -> MockResult<Json<Value>> {
    let mut store = state.store.lock().await;
    staff(&store, &headers)?;
    ok(store.update_room(id, &form)?, "Salón actualizado")
}

async fn delete_room(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> MockResult<Json<Value>> {
    let mut store = state.store.lock().await;
    staff(&store, &headers)?;
    store.delete_room(id)?;
    Ok(Json(json!({"success": true, "message": "Salón eliminado"})))
}

// ========== Tables ==========

/// `fecha` is accepted but tables are not filtered by date.
#[derive(Debug, Deserialize)]
struct TableListQuery {
    capacidad: Option<u32>,
}

async fn list_tables(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<TableListQuery>,
) -> MockResult<Json<Value>> {
    let store = state.store.lock().await;
    staff(&store, &headers)?;
    Ok(Json(json!({ "mesas": store.list_tables(query.capacidad) })))
}

fn parse_field<T: std::str::FromStr>(name: &str, raw: &str) -> MockResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| MockError::Unprocessable(format!("{name} inválido: {raw}")))
}

async fn read_table_form(mut multipart: Multipart) -> MockResult<TableInput> {
    let bad = |e: axum::extract::multipart::MultipartError| MockError::Unprocessable(e.body_text());
    let mut input = TableInput::default();
    while let Some(field) = multipart.next_field().await.map_err(bad)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "imagen" {
            input.image = field.file_name().map(str::to_string);
            field.bytes().await.map_err(bad)?;
            continue;
        }
        let text = field.text().await.map_err(bad)?;
        match name.as_str() {
            "numero_mesa" => input.number = Some(text.trim().to_string()),
            "capacidad" => input.capacity = Some(parse_field("capacidad", &text)?),
            "id_salon" => input.room_id = Some(parse_field("id_salon", &text)?),
            "estado" => input.status = Some(TableStatus::from(text)),
            _ => {}
        }
    }
    Ok(input)
}

async fn create_table(
    State(state): State<Shared>,
    headers: HeaderMap,
    multipart: Multipart,
) -> MockResult<Json<Value>> {
    staff(&*state.store.lock().await, &headers)?;
    let input = read_table_form(multipart).await?;
    let table = state.store.lock().await.create_table(input)?;
    ok(table, "Mesa creada")
}

/// `POST /ajustes/mesas/{id}` is only an update when overridden to PUT.
async fn update_table(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> MockResult<Json<Value>> {
    staff(&*state.store.lock().await, &headers)?;
    let overridden = headers
        .get(METHOD_OVERRIDE_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|method| method.eq_ignore_ascii_case("PUT"));
    if !overridden {
        return Err(MockError::Unprocessable("Método no soportado".into()));
    }
    let input = read_table_form(multipart).await?;
    let table = state.store.lock().await.update_table(id, input)?;
    ok(table, "Mesa actualizada")
}

async fn delete_table(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> MockResult<Json<Value>> {
    let mut store = state.store.lock().await;
    staff(&store, &headers)?;
    store.delete_table(id)?;
    Ok(Json(json!({"success": true, "message": "Mesa eliminada"})))
}

async fn available_tables(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(req): Json<AvailabilityRequest>,
) -> MockResult<Json<Value>> {
    let store = state.store.lock().await;
    caller(&store, &headers)?;
    ok(store.availability(&req)?, "Disponibilidad")
}

// ========== Reservations ==========

async fn list_reservations(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(filter): Query<ReservationFilter>,
) -> MockResult<Json<Value>> {
    let store = state.store.lock().await;
    staff(&store, &headers)?;
    ok(store.list_reservations(&filter), "Reservas")
}

async fn my_reservations(State(state): State<Shared>, headers: HeaderMap) -> MockResult<Json<Value>> {
    let store = state.store.lock().await;
    let user = caller(&store, &headers)?;
    ok(store.reservations_of(user.id), "Mis reservas")
}

async fn create_reservation(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(payload): Json<ReservationCreate>,
) -> MockResult<Json<Value>> {
    let mut store = state.store.lock().await;
    let user = caller(&store, &headers)?;
    let reservation = store.create_reservation(&user, payload)?;
    tracing::info!(reservation_id = reservation.id, "Mock reservation created");
    ok(reservation, "Reserva creada")
}

async fn update_reservation(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(update): Json<ReservationUpdate>,
) -> MockResult<Json<Value>> {
    let mut store = state.store.lock().await;
    staff(&store, &headers)?;
    ok(store.update_reservation(id, update)?, "Reserva actualizada")
}

async fn change_status(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(change): Json<StatusChange>,
) -> MockResult<Json<Value>> {
    let mut store = state.store.lock().await;
    owner_or_staff(&store, &headers, id)?;
    ok(store.change_status(id, change)?, "Estado actualizado")
}

async fn delete_reservation(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> MockResult<Json<Value>> {
    let mut store = state.store.lock().await;
    owner_or_staff(&store, &headers, id)?;
    store.delete_reservation(id)?;
    Ok(Json(json!({"success": true, "message": "Reserva eliminada"})))
}

async fn customers(State(state): State<Shared>, headers: HeaderMap) -> MockResult<Json<Value>> {
    let store = state.store.lock().await;
    staff(&store, &headers)?;
    ok(store.customers(), "Clientes")
}

/// Routes relative to [`API_PREFIX`]
pub fn router(state: Shared) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/logout", post(logout))
        // Rooms and tables
        .route("/ajustes/salones", get(list_rooms).post(create_room))
        .route("/ajustes/salones/{id}", put(update_room).delete(delete_room))
        .route("/ajustes/mesas", get(list_tables).post(create_table))
        .route("/ajustes/mesas/{id}", post(update_table).delete(delete_table))
        .route("/mesas-disponibles", post(available_tables))
        // Reservations
        .route("/reservas", get(list_reservations).post(create_reservation))
        .route("/reservas/{id}", put(update_reservation).delete(delete_reservation))
        .route("/reservas/{id}/cambiar-estado", patch(change_status))
        .route("/mis-reservas", get(my_reservations))
        .route("/usuarios-clientes", get(customers))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}
