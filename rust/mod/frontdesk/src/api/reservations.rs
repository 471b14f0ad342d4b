use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use resort_core::{ListParams, ListResult, ServiceError};
use serde::Deserialize;

use crate::model::Reservation;
use crate::service::{IssuedCode, ReservationFilters};

use super::{parse_opt, perm, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reservations", get(list_reservations).post(create_reservation))
        .route("/reservations/{id}", get(get_reservation).delete(delete_reservation))
        .route("/reservations/{id}/@cancel", post(cancel_reservation))
        .route("/reservations/{id}/@checkin", post(check_in_reservation))
        .route("/reservations/{id}/@issue-code", post(issue_code))
}

#[derive(Deserialize)]
struct ReservationQuery {
    status: Option<String>,
    limit: Option<usize>,
    offset: Option<usize>,
}

// ---------------------------------------------------------------------------
// GET /reservations
// ---------------------------------------------------------------------------

async fn list_reservations(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(q): Query<ReservationQuery>,
) -> Result<Json<ListResult<Reservation>>, ServiceError> {
    state.auth.check(&headers, &perm("reservation", "list"))?;

    let mut params = ListParams::default();
    if let Some(limit) = q.limit {
        params.limit = limit;
    }
    params.offset = q.offset.unwrap_or(0);
    let filters = ReservationFilters {
        status: parse_opt(q.status.as_deref())?,
    };
    Ok(Json(state.service.list_reservations(&params, &filters)?))
}

// ---------------------------------------------------------------------------
// POST /reservations
// ---------------------------------------------------------------------------

async fn create_reservation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(reservation): Json<Reservation>,
) -> Result<(StatusCode, Json<Reservation>), ServiceError> {
    state.auth.check(&headers, &perm("reservation", "create"))?;
    let created = state.service.create_reservation(reservation)?;
    Ok((StatusCode::CREATED, Json(created)))
}

// ---------------------------------------------------------------------------
// GET /reservations/{id}
// ---------------------------------------------------------------------------

async fn get_reservation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Reservation>, ServiceError> {
    state.auth.check(&headers, &perm("reservation", "read"))?;
    Ok(Json(state.service.get_reservation(&id)?))
}

// ---------------------------------------------------------------------------
// DELETE /reservations/{id}
// ---------------------------------------------------------------------------

async fn delete_reservation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    state.auth.check(&headers, &perm("reservation", "delete"))?;
    state.service.delete_reservation(&id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

// ---------------------------------------------------------------------------
// POST /reservations/{id}/@cancel
// ---------------------------------------------------------------------------

async fn cancel_reservation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Reservation>, ServiceError> {
    state.auth.check(&headers, &perm("reservation", "cancel"))?;
    Ok(Json(state.service.cancel_reservation(&id).await?))
}

// ---------------------------------------------------------------------------
// POST /reservations/{id}/@checkin
// ---------------------------------------------------------------------------

async fn check_in_reservation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Reservation>, ServiceError> {
    state.auth.check(&headers, &perm("reservation", "checkin"))?;
    Ok(Json(state.service.check_in_reservation(&id).await?))
}

// ---------------------------------------------------------------------------
// POST /reservations/{id}/@issue-code
// ---------------------------------------------------------------------------

async fn issue_code(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<IssuedCode>, ServiceError> {
    state.auth.check(&headers, &perm("reservation", "issue-code"))?;
    Ok(Json(state.service.issue_verification_code(&id).await?))
}
