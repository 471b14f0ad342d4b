use resort_core::ServiceError;
use tracing::info;

use crate::model::{Accommodation, AccommodationStatus, AccommodationType};

use super::FrontDeskService;

#[derive(Debug, Default)]
pub struct AccommodationFilters {
    pub kind: Option<AccommodationType>,
}

impl FrontDeskService {
    pub fn create_accommodation(&self, accommodation: Accommodation) -> Result<Accommodation, ServiceError> {
        if accommodation.name.trim().is_empty() {
            return Err(ServiceError::Validation("name is required".into()));
        }
        self.accommodations.save_new(accommodation)
    }

    /// Sorted by name.
    pub fn list_accommodations(
        &self,
        filters: &AccommodationFilters,
    ) -> Result<Vec<Accommodation>, ServiceError> {
        let mut all: Vec<Accommodation> = self
            .accommodations
            .list()?
            .into_iter()
            .filter(|a| filters.kind.map_or(true, |k| a.kind == k))
            .collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    pub fn get_accommodation(&self, id: &str) -> Result<Accommodation, ServiceError> {
        self.accommodations.get_or_err(id)
    }

    pub fn set_accommodation_status(
        &self,
        id: &str,
        status: AccommodationStatus,
    ) -> Result<Accommodation, ServiceError> {
        let mut accommodation = self.accommodations.get_or_err(id)?;
        accommodation.status = status;
        let saved = self.accommodations.save(accommodation)?;
        info!("accommodation {} marked {:?}", saved.name, status);
        Ok(saved)
    }
}
