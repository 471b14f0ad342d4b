use resort_core::ServiceError;
use serde::Serialize;
use thiserror::Error;

use crate::model::Reservation;

/// Why a scan did not check anyone in. Every variant is recoverable by
/// scanning again; the Display text is what the operator sees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckInError {
    #[error("This QR code is not valid. Please scan a valid reservation QR code.")]
    InvalidFormat,

    #[error("This QR code is missing required information. It may not be from our system.")]
    MissingFields,

    #[error("Reservation not found in our system. Please ensure the QR code was generated properly.")]
    NotFound,

    #[error("This reservation has been cancelled. Please contact the front desk for assistance.")]
    Cancelled,

    #[error("This reservation is still pending confirmation. Please wait for confirmation before checking in.")]
    PendingConfirmation,

    #[error("This reservation has already been checked in. Cannot check in again.")]
    AlreadyCheckedIn,

    #[error("QR code not properly configured. Please regenerate the QR code from the admin panel.")]
    MisconfiguredCode,

    #[error("Verification code mismatch. This may be an old or regenerated QR code.")]
    CodeMismatch,

    #[error("This reservation was just checked in by another scan. Cannot check in again.")]
    ConcurrentCheckIn,

    /// The detail is for logs; operators get the generic message.
    #[error("Scanning failed. Please try again or contact support.")]
    StoreUnavailable(String),
}

/// Stable outcome tag surfaced to the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutcomeKind {
    InvalidFormat,
    MissingFields,
    NotFound,
    Cancelled,
    PendingConfirmation,
    AlreadyCheckedIn,
    MisconfiguredCode,
    CodeMismatch,
    ConcurrentCheckIn,
    StoreUnavailable,
}

impl CheckInError {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            CheckInError::InvalidFormat => OutcomeKind::InvalidFormat,
            CheckInError::MissingFields => OutcomeKind::MissingFields,
            CheckInError::NotFound => OutcomeKind::NotFound,
            CheckInError::Cancelled => OutcomeKind::Cancelled,
            CheckInError::PendingConfirmation => OutcomeKind::PendingConfirmation,
            CheckInError::AlreadyCheckedIn => OutcomeKind::AlreadyCheckedIn,
            CheckInError::MisconfiguredCode => OutcomeKind::MisconfiguredCode,
            CheckInError::CodeMismatch => OutcomeKind::CodeMismatch,
            CheckInError::ConcurrentCheckIn => OutcomeKind::ConcurrentCheckIn,
            CheckInError::StoreUnavailable(_) => OutcomeKind::StoreUnavailable,
        }
    }
}

impl From<CheckInError> for ServiceError {
    fn from(e: CheckInError) -> Self {
        match e {
            e @ CheckInError::NotFound => ServiceError::NotFound(e.to_string()),
            e @ CheckInError::ConcurrentCheckIn => ServiceError::Conflict(e.to_string()),
            CheckInError::StoreUnavailable(detail) => ServiceError::Storage(detail),
            other => ServiceError::Validation(other.to_string()),
        }
    }
}

/// Tagged result handed to the caller:
/// `{"ok": true, "reservation": {...}}` or
/// `{"ok": false, "kind": "CodeMismatch", "message": "..."}`.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationOutcome {
    pub ok: bool,

    /// Snapshot taken before the check-in write.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation: Option<Reservation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<OutcomeKind>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<Result<Reservation, CheckInError>> for VerificationOutcome {
    fn from(result: Result<Reservation, CheckInError>) -> Self {
        match result {
            Ok(reservation) => Self {
                ok: true,
                reservation: Some(reservation),
                kind: None,
                message: None,
            },
            Err(e) => Self {
                ok: false,
                reservation: None,
                kind: Some(e.kind()),
                message: Some(e.to_string()),
            },
        }
    }
}
