use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::locations_errors::LocationError;
use super::Result;

/// Domain model representing a branch of the business
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for registering a new branch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

impl NewLocation {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(LocationError::InvalidData(
                "Location name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Input model for renaming or deactivating a branch. Locations referenced
/// by history are never deleted, only deactivated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdate {
    pub id: String,
    pub name: String,
    pub is_active: bool,
}

impl LocationUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(LocationError::InvalidData(
                "Location ID is required for updates".to_string(),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(LocationError::InvalidData(
                "Location name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Database model for locations
#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::locations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LocationDB {
    pub id: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<LocationDB> for Location {
    fn from(db: LocationDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            is_active: db.is_active,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewLocation> for LocationDB {
    fn from(new: NewLocation) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: new.id.unwrap_or_default(),
            name: new.name,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
