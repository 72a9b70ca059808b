use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::locations_model::{Location, LocationDB, LocationUpdate, NewLocation};
use super::{LocationError, Result};
use crate::db::get_connection;
use crate::schema::locations;
use crate::schema::locations::dsl::*;

/// Repository for managing location data in the database
pub struct LocationRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl LocationRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    pub fn create(&self, new_location: NewLocation) -> Result<Location> {
        new_location.validate()?;

        let mut location_db: LocationDB = new_location.into();
        if location_db.id.is_empty() {
            location_db.id = uuid::Uuid::new_v4().to_string();
        }

        let mut conn = get_connection(&self.pool)
            .map_err(|e| LocationError::DatabaseError(e.to_string()))?;

        diesel::insert_into(locations::table)
            .values(&location_db)
            .execute(&mut conn)?;

        Ok(location_db.into())
    }

    pub fn update(&self, update: LocationUpdate) -> Result<Location> {
        update.validate()?;

        let mut conn = get_connection(&self.pool)
            .map_err(|e| LocationError::DatabaseError(e.to_string()))?;

        let mut location_db = locations
            .find(&update.id)
            .first::<LocationDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    LocationError::NotFound(format!("Location with id {} not found", update.id))
                }
                _ => LocationError::DatabaseError(e.to_string()),
            })?;

        location_db.name = update.name;
        location_db.is_active = update.is_active;
        location_db.updated_at = chrono::Utc::now().naive_utc();

        diesel::update(locations.find(&location_db.id))
            .set(&location_db)
            .execute(&mut conn)?;

        Ok(location_db.into())
    }

    pub fn get_by_id(&self, location_id: &str) -> Result<Location> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| LocationError::DatabaseError(e.to_string()))?;

        let location = locations
            .find(location_id)
            .first::<LocationDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    LocationError::NotFound(format!("Location with id {} not found", location_id))
                }
                _ => LocationError::DatabaseError(e.to_string()),
            })?;

        Ok(location.into())
    }

    pub fn get_by_name(&self, location_name: &str) -> Result<Location> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| LocationError::DatabaseError(e.to_string()))?;

        let location = locations
            .filter(name.eq(location_name))
            .first::<LocationDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    LocationError::NotFound(format!("Location '{}' not found", location_name))
                }
                _ => LocationError::DatabaseError(e.to_string()),
            })?;

        Ok(location.into())
    }

    pub fn list(&self, is_active_filter: Option<bool>) -> Result<Vec<Location>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| LocationError::DatabaseError(e.to_string()))?;

        let mut query = locations.into_boxed();
        if let Some(active) = is_active_filter {
            query = query.filter(is_active.eq(active));
        }

        query
            .order(name.asc())
            .load::<LocationDB>(&mut conn)
            .map(|rows| rows.into_iter().map(Location::from).collect())
            .map_err(LocationError::from)
    }
}
