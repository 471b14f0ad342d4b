use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use resort_core::ServiceError;
use serde::{Deserialize, Serialize};

use crate::model::{Account, AccountRole};
use crate::service::CreateAccountInput;

use super::{parse_opt, perm, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/accounts/{role}/{id}", get(get_account).delete(delete_account))
}

#[derive(Deserialize)]
struct AccountQuery {
    /// A role name, or `all`.
    role: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAccountRequest {
    role: String,
    full_name: String,
    email: String,
    #[serde(default)]
    phone: Option<String>,
    password: String,
}

/// Directory entry as the console lists it.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountSummary {
    #[serde(flatten)]
    account: Account,
    initials: String,
    role_label: &'static str,
}

impl From<Account> for AccountSummary {
    fn from(account: Account) -> Self {
        Self {
            initials: account.initials(),
            role_label: account.role.label(),
            account,
        }
    }
}

fn parse_role(raw: &str) -> Result<AccountRole, ServiceError> {
    raw.parse().map_err(ServiceError::Validation)
}

async fn list_accounts(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(q): Query<AccountQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    state.auth.check(&headers, &perm("account", "list"))?;
    let role = match q.role.as_deref() {
        Some("all") => None,
        other => parse_opt(other)?,
    };
    let items: Vec<AccountSummary> = state
        .service
        .list_accounts(role)?
        .into_iter()
        .map(AccountSummary::from)
        .collect();
    Ok(Json(serde_json::json!({
        "total": items.len(),
        "items": items,
    })))
}

async fn create_account(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountSummary>), ServiceError> {
    state.auth.check(&headers, &perm("account", "create"))?;
    let account = state.service.create_account(CreateAccountInput {
        role: parse_role(&req.role)?,
        full_name: req.full_name,
        email: req.email,
        phone: req.phone,
        password: req.password,
    })?;
    Ok((StatusCode::CREATED, Json(account.into())))
}

async fn get_account(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((role, id)): Path<(String, String)>,
) -> Result<Json<AccountSummary>, ServiceError> {
    state.auth.check(&headers, &perm("account", "read"))?;
    let account = state.service.get_account(parse_role(&role)?, &id)?;
    Ok(Json(account.into()))
}

async fn delete_account(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((role, id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    state.auth.check(&headers, &perm("account", "delete"))?;
    state.service.delete_account(parse_role(&role)?, &id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
