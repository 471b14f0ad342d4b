use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use resort_core::ServiceError;
use serde::Deserialize;

use crate::checkin::VerificationOutcome;

use super::{perm, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/checkin/@verify", post(verify))
}

#[derive(Deserialize)]
struct VerifyRequest {
    /// Raw text read from the QR code.
    payload: String,
}

/// Rejections are part of the outcome body; the status is 200 either way.
async fn verify(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<VerificationOutcome>, ServiceError> {
    state.auth.check(&headers, &perm("checkin", "verify"))?;
    Ok(Json(state.service.verifier().verify_outcome(&req.payload).await))
}
