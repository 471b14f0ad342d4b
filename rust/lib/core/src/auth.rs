//! Authentication trait for module routers.
//!
//! Modules do NOT depend on a specific token scheme. They only know this
//! trait; the concrete implementation is injected at startup.

use axum::http::HeaderMap;

use crate::ServiceError;

/// Pluggable authenticator. Module handlers call this before every
/// protected operation.
///
/// The check receives the request headers (for extracting tokens) and a
/// permission string of the form `module:resource:action`.
pub trait Authenticator: Send + Sync + 'static {
    /// Authenticate a request and check the given permission.
    ///
    /// Returns `Ok(())` if allowed, `Err(ServiceError)` if denied.
    fn check(&self, headers: &HeaderMap, permission: &str) -> Result<(), ServiceError>;
}

/// Allows everything. Used in tests.
pub struct AllowAll;

impl Authenticator for AllowAll {
    fn check(&self, _headers: &HeaderMap, _permission: &str) -> Result<(), ServiceError> {
        Ok(())
    }
}

/// Denies everything. Used in tests.
pub struct DenyAll;

impl Authenticator for DenyAll {
    fn check(&self, _headers: &HeaderMap, permission: &str) -> Result<(), ServiceError> {
        Err(ServiceError::Unauthorized(format!("not allowed: {}", permission)))
    }
}
