//! The Reservation Store the check-in flow reads and writes through.

use std::sync::Arc;

use async_trait::async_trait;
use resort_core::ServiceError;
use resort_kv::KVStore;
use thiserror::Error;
use tracing::debug;

use crate::model::{BusinessIdClaim, QrData, Reservation, ReservationStatus};
use crate::store::Collection;

#[derive(Error, Debug)]
pub enum StoreError {
    /// No record with the given storage key.
    #[error("reservation record '{0}' not found")]
    NotFound(String),

    /// Backend failure (I/O, corrupt document, contention).
    #[error("reservation store unavailable: {0}")]
    Unavailable(String),
}

impl From<ServiceError> for StoreError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound(msg) => StoreError::NotFound(msg),
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => ServiceError::NotFound(format!("reservation '{}' not found", id)),
            StoreError::Unavailable(msg) => ServiceError::Storage(msg),
        }
    }
}

/// Partial update of a reservation. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservationPatch {
    pub status: Option<ReservationStatus>,
    pub checked_in: Option<bool>,
    pub check_in_time: Option<String>,
    /// Written to the canonical nested field only.
    pub verification_code: Option<String>,
}

impl ReservationPatch {
    /// The check-in commit: status, mirror flag and timestamp together.
    pub fn check_in(at: String) -> Self {
        Self {
            status: Some(ReservationStatus::CheckedIn),
            checked_in: Some(true),
            check_in_time: Some(at),
            verification_code: None,
        }
    }

    pub fn cancel() -> Self {
        Self {
            status: Some(ReservationStatus::Cancelled),
            ..Default::default()
        }
    }

    pub fn apply(&self, r: &mut Reservation) {
        if let Some(status) = self.status {
            r.status = status;
        }
        if let Some(checked_in) = self.checked_in {
            r.checked_in = checked_in;
        }
        if let Some(at) = &self.check_in_time {
            r.check_in_time = Some(at.clone());
        }
        if let Some(code) = &self.verification_code {
            r.qr_data
                .get_or_insert_with(QrData::default)
                .verification_code = Some(code.clone());
        }
    }
}

/// Reservation Store: point lookup by business id plus field updates
/// addressed by storage key.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Find the reservation whose `reservationId` equals `reservation_id`.
    async fn find_by_business_id(
        &self,
        reservation_id: &str,
    ) -> Result<Option<Reservation>, StoreError>;

    /// Apply `patch` to the record stored under `record_id`.
    async fn update(&self, record_id: &str, patch: &ReservationPatch) -> Result<(), StoreError>;

    /// Apply `patch` only if the record's status is still `expected` and
    /// its legacy `checkedIn` flag is not set.
    ///
    /// Returns `Ok(false)` without writing when the precondition fails.
    async fn update_if_status(
        &self,
        record_id: &str,
        expected: ReservationStatus,
        patch: &ReservationPatch,
    ) -> Result<bool, StoreError>;
}

/// ReservationStore over the KV backend.
pub struct KvReservationStore {
    reservations: Collection<Reservation>,
    claims: Collection<BusinessIdClaim>,
}

impl KvReservationStore {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self {
            reservations: Collection::new(kv.clone()),
            claims: Collection::new(kv),
        }
    }

    /// Read-modify-write of one record under compare-and-set, so writes
    /// landing between our read and our swap are never lost. `apply`
    /// returning false skips the write and yields `Ok(false)`.
    pub fn modify<F>(&self, record_id: &str, apply: F) -> Result<bool, StoreError>
    where
        F: FnMut(&mut Reservation) -> bool,
    {
        self.reservations
            .modify(record_id, apply)
            .map_err(|e| match e {
                ServiceError::NotFound(_) => StoreError::NotFound(record_id.to_string()),
                other => StoreError::Unavailable(other.to_string()),
            })
    }
}

#[async_trait]
impl ReservationStore for KvReservationStore {
    async fn find_by_business_id(
        &self,
        reservation_id: &str,
    ) -> Result<Option<Reservation>, StoreError> {
        if let Some(claim) = self.claims.get(reservation_id)? {
            if let Some(r) = self.reservations.get(&claim.record_id)? {
                if r.reservation_id == reservation_id {
                    return Ok(Some(r));
                }
            }
        }
        // Records created before claims existed are only reachable by scan.
        Ok(self
            .reservations
            .find(|r| r.reservation_id == reservation_id)?)
    }

    async fn update(&self, record_id: &str, patch: &ReservationPatch) -> Result<(), StoreError> {
        self.modify(record_id, |record| {
            patch.apply(record);
            true
        })?;
        Ok(())
    }

    async fn update_if_status(
        &self,
        record_id: &str,
        expected: ReservationStatus,
        patch: &ReservationPatch,
    ) -> Result<bool, StoreError> {
        self.modify(record_id, |record| {
            if record.status != expected || record.checked_in {
                debug!(
                    "conditional update of {} skipped: status is {} (checkedIn={}), expected {}",
                    record_id, record.status, record.checked_in, expected
                );
                return false;
            }
            patch.apply(record);
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resort_kv::MemoryStore;

    fn seeded() -> (KvReservationStore, Collection<Reservation>) {
        let kv: Arc<dyn KVStore> = Arc::new(MemoryStore::new());
        let reservations = Collection::<Reservation>::new(kv.clone());
        reservations
            .save_new(Reservation {
                id: "doc1".into(),
                reservation_id: "R-1001".into(),
                status: ReservationStatus::Confirmed,
                qr_verification_code: Some("OLD1".into()),
                ..Default::default()
            })
            .unwrap();
        (KvReservationStore::new(kv), reservations)
    }

    #[tokio::test]
    async fn finds_by_business_id_not_key() {
        let (store, _) = seeded();
        let found = store.find_by_business_id("R-1001").await.unwrap().unwrap();
        assert_eq!(found.id, "doc1");
        assert!(store.find_by_business_id("doc1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn conditional_update_respects_status() {
        let (store, reservations) = seeded();
        let patch = ReservationPatch::check_in("2024-06-01T10:00:00Z".into());

        assert!(!store
            .update_if_status("doc1", ReservationStatus::Pending, &patch)
            .await
            .unwrap());
        assert_eq!(reservations.get_or_err("doc1").unwrap().status, ReservationStatus::Confirmed);

        assert!(store
            .update_if_status("doc1", ReservationStatus::Confirmed, &patch)
            .await
            .unwrap());
        let r = reservations.get_or_err("doc1").unwrap();
        assert_eq!(r.status, ReservationStatus::CheckedIn);
        assert!(r.checked_in);
        assert_eq!(r.check_in_time.as_deref(), Some("2024-06-01T10:00:00Z"));

        // The precondition no longer holds.
        assert!(!store
            .update_if_status("doc1", ReservationStatus::Confirmed, &patch)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn legacy_checked_in_flag_blocks_the_commit() {
        let (store, reservations) = seeded();
        let mut r = reservations.get_or_err("doc1").unwrap();
        r.checked_in = true;
        r.check_in_time = Some("2024-06-01T08:00:00Z".into());
        reservations.save(r).unwrap();

        let applied = store
            .update_if_status(
                "doc1",
                ReservationStatus::Confirmed,
                &ReservationPatch::check_in("2024-06-01T09:00:00Z".into()),
            )
            .await
            .unwrap();
        assert!(!applied);
        let r = reservations.get_or_err("doc1").unwrap();
        assert_eq!(r.status, ReservationStatus::Confirmed);
        assert_eq!(r.check_in_time.as_deref(), Some("2024-06-01T08:00:00Z"));
    }

    #[tokio::test]
    async fn update_keeps_a_check_in_written_meanwhile() {
        let (store, reservations) = seeded();

        // A check-in lands between the code update's read and its write.
        let mut first_look = true;
        store
            .modify("doc1", |r| {
                if first_look {
                    first_look = false;
                    let mut other = r.clone();
                    ReservationPatch::check_in("2024-06-01T10:00:00Z".into()).apply(&mut other);
                    reservations.save(other).unwrap();
                }
                ReservationPatch {
                    verification_code: Some("NEW9".into()),
                    ..Default::default()
                }
                .apply(r);
                true
            })
            .unwrap();

        let r = reservations.get_or_err("doc1").unwrap();
        assert_eq!(r.status, ReservationStatus::CheckedIn);
        assert!(r.checked_in);
        assert_eq!(r.check_in_time.as_deref(), Some("2024-06-01T10:00:00Z"));
        assert_eq!(r.stored_verification_code(), Some("NEW9"));
    }

    #[tokio::test]
    async fn finds_through_the_claim_index() {
        let kv: Arc<dyn KVStore> = Arc::new(MemoryStore::new());
        let store = KvReservationStore::new(kv.clone());
        let reservations = Collection::<Reservation>::new(kv.clone());
        let claims = Collection::<BusinessIdClaim>::new(kv);
        for (id, business_id) in [("doc1", "R-1001"), ("doc2", "R-2002")] {
            reservations
                .save_new(Reservation {
                    id: id.into(),
                    reservation_id: business_id.into(),
                    ..Default::default()
                })
                .unwrap();
        }
        claims
            .save_new(BusinessIdClaim { reservation_id: "R-2002".into(), record_id: "doc2".into() })
            .unwrap();
        // A stale claim pointing at another record falls back to the scan.
        claims
            .save_new(BusinessIdClaim { reservation_id: "R-1001".into(), record_id: "doc2".into() })
            .unwrap();

        assert_eq!(store.find_by_business_id("R-2002").await.unwrap().unwrap().id, "doc2");
        assert_eq!(store.find_by_business_id("R-1001").await.unwrap().unwrap().id, "doc1");
    }

    #[tokio::test]
    async fn update_writes_code_to_nested_field_only() {
        let (store, reservations) = seeded();
        let patch = ReservationPatch {
            verification_code: Some("NEW9".into()),
            ..Default::default()
        };
        store.update("doc1", &patch).await.unwrap();

        let r = reservations.get_or_err("doc1").unwrap();
        assert_eq!(r.qr_data.unwrap().verification_code.as_deref(), Some("NEW9"));
        assert_eq!(r.qr_verification_code.as_deref(), Some("OLD1"));
    }

    #[tokio::test]
    async fn missing_record_is_not_found() {
        let (store, _) = seeded();
        let err = store
            .update("nope", &ReservationPatch::cancel())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
