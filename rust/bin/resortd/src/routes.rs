//! Route registration: system endpoints, login, and module routers.

use std::sync::Arc;

use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use frontdesk::service::FrontDeskService;

use crate::auth::JwtAuthenticator;
use crate::login;

/// Application shared state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<FrontDeskService>,
    pub jwt: Arc<JwtAuthenticator>,
}

/// Build the complete router. Each module is nested under `/{name}` and
/// checks its own permissions through the injected authenticator.
pub fn build_router(state: AppState, module_routes: Vec<(&str, Router)>) -> Router {
    let system_routes = Router::new()
        .route("/health", get(health))
        .route("/version", get(version));

    let mut app: Router<()> = Router::new()
        .merge(login::routes())
        .with_state(state)
        .merge(system_routes);

    for (name, router) in module_routes {
        app = app.nest(&format!("/{}", name), router);
    }
    app
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "resortd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use frontdesk::service::FrontDeskConfig;
    use frontdesk::store_impls::hash_password;
    use frontdesk::FrontDeskModule;
    use resort_core::Module;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        let kv: Arc<dyn resort_kv::KVStore> = Arc::new(resort_kv::MemoryStore::new());
        let service = Arc::new(FrontDeskService::new(kv, FrontDeskConfig::default()));
        service
            .ensure_root_admin("root@resort.test", &hash_password("open-sesame").unwrap())
            .unwrap();
        let jwt = Arc::new(JwtAuthenticator::new("s3cret", 600));
        let module = FrontDeskModule::new(service.clone(), jwt.clone());
        build_router(
            AppState { service, jwt },
            vec![(module.name(), module.routes())],
        )
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn login_request(email: &str, password: &str) -> Request<Body> {
        Request::post("/auth/login")
            .header("content-type", "application/json")
            .body(Body::from(json!({"email": email, "password": password}).to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let (status, body) = send(&app(), Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn login_then_call_protected_route() {
        let app = app();

        let req = Request::get("/frontdesk/reservations").body(Body::empty()).unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&app, login_request("ROOT@resort.test", "open-sesame")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token_type"], "Bearer");
        assert_eq!(body["account"]["role"], "admin");
        let token = body["access_token"].as_str().unwrap().to_string();

        let req = Request::get("/frontdesk/reservations")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0);
    }

    fn authed(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Bearer {}", token));
        match body {
            Some(v) => req
                .header("content-type", "application/json")
                .body(Body::from(v.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        }
    }

    #[tokio::test]
    async fn booking_reaches_check_in_over_http() {
        let app = app();
        let (_, body) = send(&app, login_request("root@resort.test", "open-sesame")).await;
        let token = body["access_token"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            authed("POST", "/frontdesk/accommodations", &token, Some(json!({"name": "Room 3", "type": "room"}))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let booking = json!({
            "reservationId": "R-5001",
            "userFullName": "Dana Lim",
            "room": {"name": "Room 3", "type": "room"},
        });
        let (status, created) =
            send(&app, authed("POST", "/frontdesk/reservations", &token, Some(booking))).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();

        let uri = format!("/frontdesk/reservations/{}/@issue-code", id);
        let (status, issued) = send(&app, authed("POST", &uri, &token, None)).await;
        assert_eq!(status, StatusCode::OK);

        let verify = json!({"payload": issued["payload"]});
        let (_, outcome) =
            send(&app, authed("POST", "/frontdesk/checkin/@verify", &token, Some(verify.clone()))).await;
        assert_eq!(outcome["ok"], true);

        let uri = format!("/frontdesk/reservations/{}", id);
        let (_, stored) = send(&app, authed("GET", &uri, &token, None)).await;
        assert_eq!(stored["status"], "checked-in");
        assert!(stored["checkInTime"].is_string());

        let (_, again) = send(&app, authed("POST", "/frontdesk/checkin/@verify", &token, Some(verify))).await;
        assert_eq!(again["ok"], false);
        let (_, after) = send(&app, authed("GET", &uri, &token, None)).await;
        assert_eq!(after["checkInTime"], stored["checkInTime"]);
    }

    #[tokio::test]
    async fn login_failures_map_to_status_codes() {
        let app = app();

        let (status, body) = send(&app, login_request("", "")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_FAILED");

        let (status, body) = send(&app, login_request("root@resort.test", "wrong")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid Admin ID or Admin Pass.");
    }
}
