//! Operator sign-in: credential checks and failed-attempt throttling.
//! Token issuance lives with the server binary.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use resort_core::ServiceError;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::model::{Account, AccountRole};
use crate::store_impls::verify_password;

use super::FrontDeskService;

const INVALID_CREDENTIALS: &str = "Invalid Admin ID or Admin Pass.";
const TOO_MANY_ATTEMPTS: &str = "Too many failed attempts. Please try again later.";

#[derive(Debug, Clone, Copy)]
pub struct LoginPolicy {
    /// Failures allowed inside one window before sign-in is refused.
    pub max_failures: u32,
    pub window: Duration,
}

impl Default for LoginPolicy {
    fn default() -> Self {
        Self {
            max_failures: 5,
            window: Duration::from_secs(5 * 60),
        }
    }
}

struct Failures {
    count: u32,
    first_at: Instant,
}

/// Per-email failure counter.
pub struct LoginGuard {
    policy: LoginPolicy,
    failures: Mutex<HashMap<String, Failures>>,
}

impl LoginGuard {
    pub fn new(policy: LoginPolicy) -> Self {
        Self {
            policy,
            failures: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Failures>>, ServiceError> {
        self.failures
            .lock()
            .map_err(|_| ServiceError::Internal("login guard lock poisoned".into()))
    }

    /// Err if `email` has used up its failures in the current window.
    fn check(&self, email: &str) -> Result<(), ServiceError> {
        let mut failures = self.lock()?;
        let expired = match failures.get(email) {
            Some(f) if f.first_at.elapsed() >= self.policy.window => true,
            Some(f) if f.count >= self.policy.max_failures => {
                return Err(ServiceError::TooManyRequests(TOO_MANY_ATTEMPTS.into()));
            }
            _ => false,
        };
        if expired {
            failures.remove(email);
        }
        Ok(())
    }

    /// Count a failure. Windows that have run out are dropped first, so
    /// emails that never come back do not pile up.
    fn record_failure(&self, email: &str) -> Result<(), ServiceError> {
        let window = self.policy.window;
        let mut failures = self.lock()?;
        failures.retain(|_, f| f.first_at.elapsed() < window);
        let entry = failures.entry(email.to_string()).or_insert(Failures {
            count: 0,
            first_at: Instant::now(),
        });
        entry.count += 1;
        Ok(())
    }

    fn clear(&self, email: &str) -> Result<(), ServiceError> {
        self.lock()?.remove(email);
        Ok(())
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.failures.lock().map(|f| f.len()).unwrap_or(0)
    }
}

/// Validate the raw login form the way the console does.
fn validate(email: &str, password: &str) -> Result<(), ServiceError> {
    match (email.is_empty(), password.is_empty()) {
        (true, true) => Err(ServiceError::Validation(
            "Please enter both Admin ID and Admin Pass.".into(),
        )),
        (true, false) => Err(ServiceError::Validation("Please enter your Admin ID.".into())),
        (false, true) => Err(ServiceError::Validation("Please enter your Admin Pass.".into())),
        (false, false) if !email.contains('@') => {
            Err(ServiceError::Validation("Please enter a valid Admin ID.".into()))
        }
        _ => Ok(()),
    }
}

impl FrontDeskService {
    /// Check operator credentials. Returns the redacted account on success.
    ///
    /// Staff and admin accounts only; customers never sign in here.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Account, ServiceError> {
        let email = email.trim().to_lowercase();
        validate(&email, password)?;
        self.login_guard.check(&email)?;

        let mut matched = None;
        for role in AccountRole::ALL.iter().filter(|r| r.can_sign_in()) {
            if let Some(account) = self.find_account_by_email(*role, &email)? {
                let ok = account
                    .password_hash
                    .as_deref()
                    .map_or(false, |h| verify_password(password, h));
                if ok {
                    matched = Some(account);
                    break;
                }
            }
        }

        match matched {
            Some(account) => {
                self.login_guard.clear(&email)?;
                info!("{} {} signed in", account.role, account.id);
                Ok(account.redacted())
            }
            None => {
                self.login_guard.record_failure(&email)?;
                warn!("failed sign-in for {}", email);
                Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.into()))
            }
        }
    }

    /// Create the root admin if no admin with this email exists yet.
    /// `password_hash` is an argon2 PHC string taken from configuration.
    pub fn ensure_root_admin(&self, email: &str, password_hash: &str) -> Result<bool, ServiceError> {
        let email = email.trim().to_lowercase();
        if self.find_account_by_email(AccountRole::Admin, &email)?.is_some() {
            return Ok(false);
        }
        self.accounts.save_new(Account {
            id: "root".into(),
            role: AccountRole::Admin,
            full_name: "Root Administrator".into(),
            email,
            phone: None,
            password_hash: Some(password_hash.to_string()),
            created_at: None,
            updated_at: None,
        })?;
        info!("root admin account created");
        Ok(true)
    }
}
