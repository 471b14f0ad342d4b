//! QR check-in: turn a scanned payload into a committed check-in or a
//! rejection reason.
//!
//! Flow: parse → look up by business id (bounded retry) → status gate →
//! resolve stored code → compare → conditional commit.

pub mod outcome;
pub mod payload;
pub mod session;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

use resort_core::now_rfc3339;
use tracing::{debug, info, warn};

use crate::model::{Reservation, ReservationStatus};

pub use outcome::{CheckInError, OutcomeKind, VerificationOutcome};
pub use payload::ScanPayload;
pub use session::ScanSession;
pub use store::{KvReservationStore, ReservationPatch, ReservationStore, StoreError};

/// Lookup retry policy. Absorbs the lag between a reservation being
/// written and becoming visible to queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total lookup attempts, including the first. At least 1.
    pub attempts: u32,
    /// Fixed wait between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

/// Status gate, checked in this order: cancelled, pending, checked in.
pub(crate) fn check_status(r: &Reservation) -> Result<(), CheckInError> {
    match r.status {
        ReservationStatus::Cancelled => Err(CheckInError::Cancelled),
        ReservationStatus::Pending => Err(CheckInError::PendingConfirmation),
        _ if r.is_checked_in() => Err(CheckInError::AlreadyCheckedIn),
        _ => Ok(()),
    }
}

/// Check-In Verifier. Holds no state between calls; the caller runs one
/// `verify` at a time per scanning session.
pub struct CheckInVerifier {
    store: Arc<dyn ReservationStore>,
    retry: RetryPolicy,
}

impl CheckInVerifier {
    pub fn new(store: Arc<dyn ReservationStore>, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Verify a scanned payload and check the guest in.
    ///
    /// Returns the reservation as it was before the write. No write happens
    /// on any error path.
    pub async fn verify(&self, raw: &str) -> Result<Reservation, CheckInError> {
        let scan = ScanPayload::parse(raw)?;
        let reservation = self.lookup(&scan.reservation_id).await?;

        check_status(&reservation)?;

        let stored = reservation
            .stored_verification_code()
            .ok_or(CheckInError::MisconfiguredCode)?;
        if scan.verification_code != stored {
            warn!("verification code mismatch for reservation {}", reservation.reservation_id);
            return Err(CheckInError::CodeMismatch);
        }

        self.commit(&reservation).await?;
        info!(
            "reservation {} checked in (record {})",
            reservation.reservation_id, reservation.id
        );
        Ok(reservation)
    }

    /// `verify`, folded into the tagged outcome the console renders.
    pub async fn verify_outcome(&self, raw: &str) -> VerificationOutcome {
        let result = self.verify(raw).await;
        if let Err(e) = &result {
            debug!("scan rejected: {:?}", e);
        }
        result.into()
    }

    async fn lookup(&self, reservation_id: &str) -> Result<Reservation, CheckInError> {
        let attempts = self.retry.attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.store.find_by_business_id(reservation_id).await {
                Ok(Some(found)) => return Ok(found),
                Ok(None) => {
                    debug!("reservation {} not visible (attempt {}/{})", reservation_id, attempt, attempts);
                    last_error = None;
                }
                Err(e) => {
                    warn!("lookup of {} failed (attempt {}/{}): {}", reservation_id, attempt, attempts, e);
                    last_error = Some(e);
                }
            }
            if attempt < attempts {
                tokio::time::sleep(self.retry.delay).await;
            }
        }

        Err(match last_error {
            Some(e) => CheckInError::StoreUnavailable(e.to_string()),
            None => CheckInError::NotFound,
        })
    }

    /// Conditional commit: only a still-confirmed record becomes checked in.
    pub(crate) async fn commit(&self, reservation: &Reservation) -> Result<(), CheckInError> {
        let patch = ReservationPatch::check_in(now_rfc3339());
        match self
            .store
            .update_if_status(&reservation.id, ReservationStatus::Confirmed, &patch)
            .await
        {
            Ok(true) => Ok(()),
            Ok(false) => {
                warn!("reservation {} changed status before commit", reservation.reservation_id);
                Err(CheckInError::ConcurrentCheckIn)
            }
            Err(StoreError::NotFound(_)) => Err(CheckInError::NotFound),
            Err(e) => Err(CheckInError::StoreUnavailable(e.to_string())),
        }
    }
}
