//! Reservations, status changes and availability

use super::ApiGateway;
use crate::envelope::{self, Shape};
use crate::error::ValidationError;
use crate::http::{ApiRequest, HttpClient};
use crate::{ClientError, ClientResult};
use serde_json::Value;
use shared::models::{
    AvailabilityRequest, AvailabilityResult, Reservation, ReservationCreate, ReservationQuery,
    ReservationUpdate, StatusChange,
};

const RESERVATION_SHAPES: [Shape; 3] = [Shape::Data, Shape::Field("reserva"), Shape::Bare];

fn ensure_id(reservation_id: i64) -> ClientResult<()> {
    if reservation_id > 0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidReservationId(reservation_id).into())
    }
}

/// Backend-assigned id of a newly created reservation.
fn created_id(body: &Value) -> Option<i64> {
    let read = |v: &Value| match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    [body.get("data"), body.get("reserva"), Some(body)]
        .into_iter()
        .flatten()
        .find_map(|record| {
            record
                .get("id_reserva")
                .or_else(|| record.get("id"))
                .and_then(read)
        })
        .filter(|id| *id > 0)
}

impl<C: HttpClient> ApiGateway<C> {
    pub async fn list_reservations(&self, query: &ReservationQuery) -> ClientResult<Vec<Reservation>> {
        let body = self
            .send(ApiRequest::get("/reservas").query(query.to_pairs()))
            .await?;
        envelope::decode(&body, &envelope::list_shapes("reservas"))
    }

    /// Reservations of the logged-in customer.
    pub async fn my_reservations(&self) -> ClientResult<Vec<Reservation>> {
        let body = self.send(ApiRequest::get("/mis-reservas")).await?;
        envelope::decode(&body, &envelope::list_shapes("reservas"))
    }

    /// Create a reservation and return its id.
    pub async fn create_reservation(&self, reservation: &ReservationCreate) -> ClientResult<i64> {
        let body = self
            .send(ApiRequest::post("/reservas").json(reservation)?)
            .await?;
        let id = created_id(&body).ok_or_else(|| {
            ClientError::InvalidResponse("created reservation without id_reserva".into())
        })?;
        tracing::info!(reservation_id = id, client_id = reservation.client_id, "Created reservation");
        Ok(id)
    }

    /// Generic field update; status goes through [`Self::change_reservation_status`].
    pub async fn update_reservation(
        &self,
        reservation_id: i64,
        update: &ReservationUpdate,
    ) -> ClientResult<Reservation> {
        ensure_id(reservation_id)?;
        let body = self
            .send(ApiRequest::put(format!("/reservas/{reservation_id}")).json(update)?)
            .await?;
        envelope::decode(&body, &RESERVATION_SHAPES)
    }

    pub async fn change_reservation_status(
        &self,
        reservation_id: i64,
        change: &StatusChange,
    ) -> ClientResult<Reservation> {
        ensure_id(reservation_id)?;
        let body = self
            .send(ApiRequest::patch(format!("/reservas/{reservation_id}/cambiar-estado")).json(change)?)
            .await?;
        tracing::info!(reservation_id, status = %change.status, "Changed reservation status");
        envelope::decode(&body, &RESERVATION_SHAPES)
    }

    /// Soft-delete a reservation.
    pub async fn delete_reservation(&self, reservation_id: i64) -> ClientResult<()> {
        ensure_id(reservation_id)?;
        self.send(ApiRequest::delete(format!("/reservas/{reservation_id}")))
            .await?;
        tracing::info!(reservation_id, "Deleted reservation");
        Ok(())
    }

    /// Free and busy tables for a window; only a `{success: true, data}` body counts.
    pub async fn check_availability(&self, request: &AvailabilityRequest) -> ClientResult<AvailabilityResult> {
        let body = self
            .send(ApiRequest::post("/mesas-disponibles").json(request)?)
            .await?;
        envelope::decode(&body, &[Shape::SuccessData])
    }
}
