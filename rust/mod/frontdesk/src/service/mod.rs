pub mod accommodation;
pub mod directory;
pub mod reservation;
pub mod session;

use std::sync::Arc;

use resort_kv::KVStore;

use crate::checkin::{CheckInVerifier, KvReservationStore, RetryPolicy};
use crate::model::{Accommodation, Account, BusinessIdClaim, Reservation};
use crate::store::Collection;

pub use accommodation::AccommodationFilters;
pub use directory::CreateAccountInput;
pub use reservation::{IssuedCode, ReservationFilters};
pub use session::{LoginGuard, LoginPolicy};

/// Tunables for the front-desk service.
#[derive(Debug, Clone, Default)]
pub struct FrontDeskConfig {
    pub retry: RetryPolicy,
    pub login: LoginPolicy,
}

/// Front-desk service: owns the collections and the check-in verifier and
/// carries the console's business rules.
pub struct FrontDeskService {
    pub(crate) reservations: Collection<Reservation>,
    pub(crate) reservation_ids: Collection<BusinessIdClaim>,
    pub(crate) accommodations: Collection<Accommodation>,
    pub(crate) accounts: Collection<Account>,
    pub(crate) reservation_store: Arc<KvReservationStore>,
    pub(crate) login_guard: LoginGuard,
    verifier: CheckInVerifier,
}

impl FrontDeskService {
    pub fn new(kv: Arc<dyn KVStore>, config: FrontDeskConfig) -> Self {
        let reservation_store = Arc::new(KvReservationStore::new(kv.clone()));
        let verifier = CheckInVerifier::new(reservation_store.clone(), config.retry);
        Self {
            reservations: Collection::new(kv.clone()),
            reservation_ids: Collection::new(kv.clone()),
            accommodations: Collection::new(kv.clone()),
            accounts: Collection::new(kv),
            reservation_store,
            login_guard: LoginGuard::new(config.login),
            verifier,
        }
    }

    pub fn verifier(&self) -> &CheckInVerifier {
        &self.verifier
    }
}

#[cfg(test)]
pub(crate) fn test_service() -> FrontDeskService {
    use std::time::Duration;

    let kv: Arc<dyn KVStore> = Arc::new(resort_kv::MemoryStore::new());
    FrontDeskService::new(
        kv,
        FrontDeskConfig {
            retry: RetryPolicy { attempts: 1, delay: Duration::ZERO },
            login: LoginPolicy::default(),
        },
    )
}
