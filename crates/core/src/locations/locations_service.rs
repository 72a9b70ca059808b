use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::sync::Arc;

use super::locations_model::{Location, LocationUpdate, NewLocation};
use super::locations_repository::LocationRepository;
use super::Result;

/// Service for managing branches
pub struct LocationService {
    repository: LocationRepository,
}

impl LocationService {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self {
            repository: LocationRepository::new(pool),
        }
    }

    pub fn create_location(&self, new_location: NewLocation) -> Result<Location> {
        debug!("Creating location '{}'", new_location.name);
        self.repository.create(new_location)
    }

    pub fn update_location(&self, update: LocationUpdate) -> Result<Location> {
        self.repository.update(update)
    }

    /// Deactivates a branch. History referencing it stays intact.
    pub fn deactivate_location(&self, location_id: &str) -> Result<Location> {
        let location = self.repository.get_by_id(location_id)?;
        self.repository.update(LocationUpdate {
            id: location.id,
            name: location.name,
            is_active: false,
        })
    }

    pub fn get_location(&self, location_id: &str) -> Result<Location> {
        self.repository.get_by_id(location_id)
    }

    pub fn get_location_by_name(&self, location_name: &str) -> Result<Location> {
        self.repository.get_by_name(location_name)
    }

    pub fn list_locations(&self, is_active_filter: Option<bool>) -> Result<Vec<Location>> {
        self.repository.list(is_active_filter)
    }
}
