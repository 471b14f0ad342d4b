use resort_core::{new_id, ListParams, ListResult, ServiceError};
use serde::Serialize;
use tracing::{info, warn};

use crate::checkin::{check_status, ReservationPatch, ReservationStore, ScanPayload};
use crate::model::{BusinessIdClaim, Reservation, ReservationStatus};

use super::FrontDeskService;

/// Length of a generated verification code.
const CODE_LEN: usize = 6;

#[derive(Debug, Default)]
pub struct ReservationFilters {
    pub status: Option<ReservationStatus>,
}

/// A freshly issued verification code and the QR payload that carries it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedCode {
    pub reservation_id: String,
    pub verification_code: String,
    pub payload: String,
}

impl FrontDeskService {
    /// Newest first, optionally filtered by status.
    pub fn list_reservations(
        &self,
        params: &ListParams,
        filters: &ReservationFilters,
    ) -> Result<ListResult<Reservation>, ServiceError> {
        let mut all: Vec<Reservation> = self
            .reservations
            .list()?
            .into_iter()
            .filter(|r| filters.status.map_or(true, |s| r.status == s))
            .collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(params.paginate(all))
    }

    pub fn get_reservation(&self, id: &str) -> Result<Reservation, ServiceError> {
        self.reservations.get_or_err(id)
    }

    /// Insert a reservation. `reservationId` must be unique.
    ///
    /// The business id is claimed atomically before the record is written,
    /// so two concurrent creates cannot both succeed.
    pub fn create_reservation(&self, mut reservation: Reservation) -> Result<Reservation, ServiceError> {
        let business_id = reservation.reservation_id.trim().to_string();
        if business_id.is_empty() {
            return Err(ServiceError::Validation("reservationId is required".into()));
        }
        reservation.reservation_id = business_id.clone();
        if reservation.id.is_empty() {
            reservation.id = new_id();
        }

        let duplicate = || ServiceError::Conflict(format!("reservation '{}' already exists", business_id));
        self.reservation_ids
            .save_new(BusinessIdClaim {
                reservation_id: business_id.clone(),
                record_id: reservation.id.clone(),
            })
            .map_err(|e| match e {
                ServiceError::Conflict(_) => duplicate(),
                other => other,
            })?;

        // Records written before claims existed are only found by scanning.
        let saved = match self.reservations.find(|r| r.reservation_id == business_id) {
            Ok(Some(_)) => Err(duplicate()),
            Ok(None) => self.reservations.save_new(reservation),
            Err(e) => Err(e),
        };
        if saved.is_err() {
            self.release_business_id(&business_id);
        }
        saved
    }

    fn release_business_id(&self, business_id: &str) {
        match self.reservation_ids.delete(business_id) {
            Ok(()) | Err(ServiceError::NotFound(_)) => {}
            Err(e) => warn!("could not release reservation id {}: {}", business_id, e),
        }
    }

    /// Cancel a pending or confirmed reservation.
    pub async fn cancel_reservation(&self, id: &str) -> Result<Reservation, ServiceError> {
        let current = self.reservations.get_or_err(id)?;
        let cancellable = matches!(
            current.status,
            ReservationStatus::Pending | ReservationStatus::Confirmed
        ) && !current.checked_in;
        if !cancellable {
            return Err(ServiceError::Validation(format!(
                "cannot cancel a {} reservation",
                if current.checked_in { ReservationStatus::CheckedIn } else { current.status }
            )));
        }

        let applied = self
            .reservation_store
            .update_if_status(id, current.status, &ReservationPatch::cancel())
            .await?;
        if !applied {
            return Err(ServiceError::Conflict(format!(
                "reservation '{}' changed while cancelling",
                current.reservation_id
            )));
        }

        info!("reservation {} cancelled", current.reservation_id);
        self.reservations.get_or_err(id)
    }

    /// Hard delete. The business id becomes free for reuse.
    pub fn delete_reservation(&self, id: &str) -> Result<(), ServiceError> {
        let current = self.reservations.get_or_err(id)?;
        self.reservations.delete(id)?;

        let owned = self
            .reservation_ids
            .get(&current.reservation_id)?
            .map_or(false, |claim| claim.record_id == id);
        if owned {
            self.release_business_id(&current.reservation_id);
        }
        info!("reservation record {} deleted", id);
        Ok(())
    }

    /// Check a guest in from the details view, without a code.
    pub async fn check_in_reservation(&self, id: &str) -> Result<Reservation, ServiceError> {
        let current = self.reservations.get_or_err(id)?;
        check_status(&current)?;
        self.verifier().commit(&current).await?;

        info!("reservation {} checked in manually", current.reservation_id);
        self.reservations.get_or_err(id)
    }

    /// Give a reservation its first verification code. Codes are never
    /// replaced once issued, even by a concurrent issuance.
    pub async fn issue_verification_code(&self, id: &str) -> Result<IssuedCode, ServiceError> {
        let code = new_id()[..CODE_LEN].to_ascii_uppercase();
        let patch = ReservationPatch {
            verification_code: Some(code.clone()),
            ..Default::default()
        };

        let mut business_id = String::new();
        let written = self.reservation_store.modify(id, |r| {
            business_id = r.reservation_id.clone();
            if r.stored_verification_code().is_some() {
                return false;
            }
            patch.apply(r);
            true
        })?;
        if !written {
            return Err(ServiceError::Conflict(format!(
                "reservation '{}' already has a verification code",
                business_id
            )));
        }
        info!("verification code issued for reservation {}", business_id);

        let payload = ScanPayload {
            reservation_id: business_id.clone(),
            verification_code: code.clone(),
        };
        Ok(IssuedCode {
            reservation_id: business_id,
            verification_code: code,
            payload: payload.encode(),
        })
    }
}
