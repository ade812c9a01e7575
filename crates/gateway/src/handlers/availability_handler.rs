//! Availability handlers.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{AvailabilityQuery, AvailabilitySlot, DATE_FORMAT};

use crate::state::AppState;

/// Query string for an availability lookup
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AvailabilityParams {
    /// Shop to search
    pub shop_id: Uuid,
    /// Service whose duration sizes the slots
    pub service_id: Uuid,
    /// Restrict to one barber
    pub barber_id: Option<Uuid>,
    /// Calendar day, `YYYY-MM-DD`
    #[param(example = "2024-06-01")]
    pub date: String,
}

impl AvailabilityParams {
    fn into_query(self) -> AppResult<AvailabilityQuery> {
        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT)
            .map_err(|_| AppError::validation("date must be formatted as YYYY-MM-DD"))?;

        Ok(AvailabilityQuery {
            shop_id: self.shop_id,
            service_id: self.service_id,
            barber_id: self.barber_id,
            date,
        })
    }
}

/// Create availability routes
pub fn availability_routes() -> Router<AppState> {
    Router::new().route("/availability", get(get_availability))
}

/// List bookable slots for one day
#[utoipa::path(
    get,
    path = "/availability",
    tag = "Availability",
    params(AvailabilityParams),
    responses(
        (status = 200, description = "Slots ordered by start time", body = Vec<AvailabilitySlot>),
        (status = 400, description = "Malformed query or inconsistent shop data"),
        (status = 404, description = "Shop, service or barber not found"),
        (status = 500, description = "Scheduling provider unavailable")
    )
)]
pub async fn get_availability(
    State(state): State<AppState>,
    params: Result<Query<AvailabilityParams>, QueryRejection>,
) -> AppResult<Json<Vec<AvailabilitySlot>>> {
    let Query(params) = params.map_err(|e| AppError::validation(e.body_text()))?;
    let slots = state.availability.find_slots(params.into_query()?).await?;
    Ok(Json(slots))
}
