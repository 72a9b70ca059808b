use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::external_ops_model::{ExternalOperation, ExternalOperationDB};
use super::{ExternalOperationError, Result};
use crate::db::get_connection;
use crate::schema::external_operations;
use crate::schema::external_operations::dsl::*;

pub struct ExternalOperationRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl ExternalOperationRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    pub fn insert(
        conn: &mut SqliteConnection,
        row: &ExternalOperationDB,
    ) -> Result<ExternalOperation> {
        diesel::insert_into(external_operations::table)
            .values(row)
            .execute(conn)?;
        ExternalOperation::try_from(row.clone())
    }

    pub fn get_by_id(&self, operation_id: &str) -> Result<ExternalOperation> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| ExternalOperationError::DatabaseError(e.to_string()))?;

        let row = external_operations
            .find(operation_id)
            .first::<ExternalOperationDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => ExternalOperationError::NotFound(format!(
                    "External operation with id {} not found",
                    operation_id
                )),
                _ => ExternalOperationError::DatabaseError(e.to_string()),
            })?;

        ExternalOperation::try_from(row)
    }

    pub fn list(
        &self,
        location_filter: Option<&str>,
        agency_filter: Option<&str>,
    ) -> Result<Vec<ExternalOperation>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| ExternalOperationError::DatabaseError(e.to_string()))?;

        let mut query = external_operations.into_boxed();
        if let Some(loc) = location_filter {
            query = query.filter(location_id.eq(loc));
        }
        if let Some(name) = agency_filter {
            query = query.filter(agency.eq(name));
        }

        query
            .order(created_at.desc())
            .load::<ExternalOperationDB>(&mut conn)?
            .into_iter()
            .map(ExternalOperation::try_from)
            .collect()
    }
}
