//! Document implementations for the front-desk models.
//!
//! Defines key prefixes, key values, and hooks for each model.

use resort_core::{new_id, now_rfc3339};

use crate::model::{Accommodation, Account, BusinessIdClaim, Reservation};
use crate::store::Document;

// ── Password helpers ──

/// Hash a plain password with argon2id.
pub fn hash_password(password: &str) -> Result<String, String> {
    use argon2::Argon2;
    use password_hash::rand_core::OsRng;
    use password_hash::{PasswordHasher, SaltString};

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| e.to_string())
}

/// Verify a password against an argon2id hash. A malformed hash never verifies.
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::Argon2;
    use password_hash::{PasswordHash, PasswordVerifier};

    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

fn stamp_created(id: &mut String, created_at: &mut Option<String>, updated_at: &mut Option<String>) {
    if id.is_empty() {
        *id = new_id();
    }
    let now = now_rfc3339();
    if created_at.is_none() {
        *created_at = Some(now.clone());
    }
    *updated_at = Some(now);
}

// ── Reservation ──

impl Document for Reservation {
    const RESOURCE: &'static str = "reservation";

    fn kv_prefix() -> &'static str {
        "frontdesk:reservation:"
    }

    fn key_value(&self) -> String {
        self.id.clone()
    }

    fn before_create(&mut self) {
        stamp_created(&mut self.id, &mut self.created_at, &mut self.updated_at);
    }

    fn before_update(&mut self) {
        self.updated_at = Some(now_rfc3339());
    }
}

/// Claims are keyed by the business id they reserve.
impl Document for BusinessIdClaim {
    const RESOURCE: &'static str = "reservation id";

    fn kv_prefix() -> &'static str {
        "frontdesk:reservation-id:"
    }

    fn key_value(&self) -> String {
        self.reservation_id.clone()
    }
}

// ── Accommodation ──

impl Document for Accommodation {
    const RESOURCE: &'static str = "accommodation";

    fn kv_prefix() -> &'static str {
        "frontdesk:accommodation:"
    }

    fn key_value(&self) -> String {
        self.id.clone()
    }

    fn before_create(&mut self) {
        stamp_created(&mut self.id, &mut self.created_at, &mut self.updated_at);
    }

    fn before_update(&mut self) {
        self.updated_at = Some(now_rfc3339());
    }
}

// ── Account ──

/// Accounts are keyed `{role}:{id}` so each role scans as its own collection.
impl Document for Account {
    const RESOURCE: &'static str = "account";

    fn kv_prefix() -> &'static str {
        "frontdesk:account:"
    }

    fn key_value(&self) -> String {
        account_key(self.role, &self.id)
    }

    fn before_create(&mut self) {
        stamp_created(&mut self.id, &mut self.created_at, &mut self.updated_at);
        self.email = self.email.trim().to_lowercase();
    }

    fn before_update(&mut self) {
        self.updated_at = Some(now_rfc3339());
    }
}

pub(crate) fn account_key(role: crate::model::AccountRole, id: &str) -> String {
    format!("{}:{}", role.as_str(), id)
}
