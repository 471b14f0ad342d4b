pub mod api;
pub mod checkin;
pub mod model;
pub mod service;
pub mod store;
pub mod store_impls;

use std::sync::Arc;

use axum::Router;
use resort_core::{Authenticator, Module};

use service::FrontDeskService;

/// Front-desk module: QR check-in plus the console's reservation,
/// accommodation and guest directory screens.
pub struct FrontDeskModule {
    service: Arc<FrontDeskService>,
    auth: Arc<dyn Authenticator>,
}

impl FrontDeskModule {
    pub fn new(service: Arc<FrontDeskService>, auth: Arc<dyn Authenticator>) -> Self {
        Self { service, auth }
    }

    pub fn service(&self) -> &Arc<FrontDeskService> {
        &self.service
    }
}

impl Module for FrontDeskModule {
    fn name(&self) -> &str {
        "frontdesk"
    }

    fn routes(&self) -> Router {
        api::router(self.service.clone(), self.auth.clone())
    }
}
