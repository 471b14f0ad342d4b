use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use resort_core::ServiceError;
use serde::Deserialize;

use crate::model::{Accommodation, AccommodationStatus};
use crate::service::AccommodationFilters;

use super::{parse_opt, perm, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accommodations", get(list_accommodations).post(create_accommodation))
        .route("/accommodations/{id}", get(get_accommodation))
        .route("/accommodations/{id}/@status", post(set_status))
}

#[derive(Deserialize)]
struct AccommodationQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Deserialize)]
struct StatusRequest {
    status: AccommodationStatus,
}

async fn list_accommodations(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(q): Query<AccommodationQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    state.auth.check(&headers, &perm("accommodation", "list"))?;
    let filters = AccommodationFilters {
        kind: parse_opt(q.kind.as_deref())?,
    };
    let items = state.service.list_accommodations(&filters)?;
    Ok(Json(serde_json::json!({
        "total": items.len(),
        "items": items,
    })))
}

async fn create_accommodation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(accommodation): Json<Accommodation>,
) -> Result<(StatusCode, Json<Accommodation>), ServiceError> {
    state.auth.check(&headers, &perm("accommodation", "create"))?;
    let created = state.service.create_accommodation(accommodation)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_accommodation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Accommodation>, ServiceError> {
    state.auth.check(&headers, &perm("accommodation", "read"))?;
    Ok(Json(state.service.get_accommodation(&id)?))
}

async fn set_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<Accommodation>, ServiceError> {
    state.auth.check(&headers, &perm("accommodation", "update"))?;
    Ok(Json(state.service.set_accommodation_status(&id, req.status)?))
}
