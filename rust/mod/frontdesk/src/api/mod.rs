mod accommodations;
mod accounts;
mod checkin;
mod reservations;

use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use resort_core::{Authenticator, ServiceError};

use crate::service::FrontDeskService;

/// Shared state for front-desk handlers.
pub struct ApiState {
    pub service: Arc<FrontDeskService>,
    pub auth: Arc<dyn Authenticator>,
}

pub type AppState = Arc<ApiState>;

/// Build the front-desk router. Mounted under `/frontdesk` by the server.
///
/// Routes:
/// - `POST   /checkin/@verify`                — verify a scanned payload
/// - `GET    /reservations`                   — list
/// - `POST   /reservations`                   — create
/// - `GET    /reservations/{id}`              — detail
/// - `DELETE /reservations/{id}`              — delete
/// - `POST   /reservations/{id}/@cancel`      — cancel
/// - `POST   /reservations/{id}/@checkin`     — manual check-in
/// - `POST   /reservations/{id}/@issue-code`  — issue verification code
/// - `GET    /accommodations`                 — list
/// - `POST   /accommodations`                 — create
/// - `GET    /accommodations/{id}`            — detail
/// - `POST   /accommodations/{id}/@status`    — set availability
/// - `GET    /accounts`                       — directory
/// - `POST   /accounts`                       — create
/// - `GET    /accounts/{role}/{id}`           — detail
/// - `DELETE /accounts/{role}/{id}`           — delete (customers only)
pub fn router(service: Arc<FrontDeskService>, auth: Arc<dyn Authenticator>) -> Router {
    let state = Arc::new(ApiState { service, auth });
    Router::new()
        .merge(checkin::routes())
        .merge(reservations::routes())
        .merge(accommodations::routes())
        .merge(accounts::routes())
        .with_state(state)
}

fn perm(resource: &str, action: &str) -> String {
    format!("frontdesk:{}:{}", resource, action)
}

/// Parse an optional query value, mapping failures to a 400.
fn parse_opt<T: FromStr<Err = String>>(raw: Option<&str>) -> Result<Option<T>, ServiceError> {
    match raw {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(ServiceError::Validation),
    }
}
