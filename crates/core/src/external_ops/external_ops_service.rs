use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use diesel::Connection;
use log::info;
use std::sync::Arc;

use super::external_ops_model::{ExternalOperation, ExternalOperationDB, NewExternalOperation};
use super::external_ops_repository::ExternalOperationRepository;
use super::{ExternalOperationError, Result};
use crate::constants::SOURCE_KIND_EXTERNAL_SERVICE;
use crate::db::get_connection;
use crate::ledger::{post_movement, PostMovementInput};

pub struct ExternalOperationService {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    repository: ExternalOperationRepository,
}

impl ExternalOperationService {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        let repository = ExternalOperationRepository::new(pool.clone());
        Self { pool, repository }
    }

    /// Records the operation and posts its single ledger movement in one
    /// transaction. A disbursement that would overdraw the pair is rejected
    /// with nothing written.
    pub fn record_operation(
        &self,
        new_operation: NewExternalOperation,
    ) -> Result<ExternalOperation> {
        new_operation.validate()?;

        let mut conn = get_connection(&self.pool)
            .map_err(|e| ExternalOperationError::DatabaseError(e.to_string()))?;

        conn.immediate_transaction(|tx_conn| {
            let row = ExternalOperationDB {
                id: uuid::Uuid::new_v4().to_string(),
                location_id: new_operation.location_id.clone(),
                currency_id: new_operation.currency_id.clone(),
                direction: new_operation.direction.as_str().to_string(),
                amount: new_operation.amount.to_string(),
                channel: new_operation.channel.as_str().to_string(),
                agency: new_operation.agency.clone(),
                reference: new_operation.reference.clone(),
                description: new_operation.description.clone(),
                created_by: new_operation.created_by.clone(),
                created_at: chrono::Utc::now().naive_utc(),
            };
            let operation = ExternalOperationRepository::insert(tx_conn, &row)?;

            post_movement(
                tx_conn,
                PostMovementInput {
                    location_id: &operation.location_id,
                    currency_id: &operation.currency_id,
                    kind: operation.direction,
                    amount: operation.amount,
                    channel: operation.channel,
                    user_id: &operation.created_by,
                    source_kind: SOURCE_KIND_EXTERNAL_SERVICE,
                    source_id: Some(&operation.id),
                    description: Some(format!("{} operation", operation.agency)),
                    allow_negative: false,
                },
            )?;

            info!(
                "External operation {} recorded for {} ({} {})",
                operation.id,
                operation.agency,
                operation.direction.as_str(),
                operation.amount
            );
            Ok(operation)
        })
    }

    pub fn get_operation(&self, operation_id: &str) -> Result<ExternalOperation> {
        self.repository.get_by_id(operation_id)
    }

    pub fn list_operations(
        &self,
        location_filter: Option<&str>,
        agency_filter: Option<&str>,
    ) -> Result<Vec<ExternalOperation>> {
        self.repository.list(location_filter, agency_filter)
    }
}
