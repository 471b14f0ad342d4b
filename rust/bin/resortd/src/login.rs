//! Operator login endpoint: checks credentials, issues a JWT.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use resort_core::ServiceError;
use serde::{Deserialize, Serialize};

use crate::routes::AppState;

/// Missing fields are reported by the credential check, not by the
/// JSON extractor.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub account: LoginAccount,
}

#[derive(Debug, Serialize)]
pub struct LoginAccount {
    pub id: String,
    pub name: String,
    pub role: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login_handler))
}

async fn login_handler(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ServiceError> {
    let account = state.service.authenticate(&body.email, &body.password)?;
    let token = state.jwt.issue_token(&account)?;
    Ok(Json(LoginResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt.expire_secs(),
        account: LoginAccount {
            id: account.id,
            name: account.full_name,
            role: account.role.to_string(),
        },
    }))
}
