use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::transfers_model::{NewTransfer, Transfer, TransferDB, TransferStatus};
use super::{Result, TransferError};
use crate::db::get_connection;
use crate::schema::transfers;
use crate::schema::transfers::dsl::*;

pub struct TransferRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl TransferRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    pub fn insert(conn: &mut SqliteConnection, new_transfer: NewTransfer) -> Result<Transfer> {
        let mut transfer_db: TransferDB = new_transfer.into();
        transfer_db.id = uuid::Uuid::new_v4().to_string();

        diesel::insert_into(transfers::table)
            .values(&transfer_db)
            .execute(conn)?;

        Transfer::try_from(transfer_db)
    }

    /// Loads a transfer inside the caller's transaction.
    pub fn get(conn: &mut SqliteConnection, transfer_id: &str) -> Result<Transfer> {
        let row = transfers
            .find(transfer_id)
            .first::<TransferDB>(conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    TransferError::NotFound(format!("Transfer with id {} not found", transfer_id))
                }
                _ => TransferError::DatabaseError(e.to_string()),
            })?;

        Transfer::try_from(row)
    }

    pub fn update_status(
        conn: &mut SqliteConnection,
        transfer_id: &str,
        new_status: TransferStatus,
    ) -> Result<()> {
        diesel::update(transfers.find(transfer_id))
            .set((
                status.eq(new_status.as_str()),
                updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(conn)?;
        Ok(())
    }

    pub fn get_by_id(&self, transfer_id: &str) -> Result<Transfer> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransferError::DatabaseError(e.to_string()))?;
        Self::get(&mut conn, transfer_id)
    }

    pub fn list(&self, status_filter: Option<TransferStatus>) -> Result<Vec<Transfer>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransferError::DatabaseError(e.to_string()))?;

        let mut query = transfers.into_boxed();
        if let Some(s) = status_filter {
            query = query.filter(status.eq(s.as_str()));
        }

        query
            .order(created_at.desc())
            .load::<TransferDB>(&mut conn)?
            .into_iter()
            .map(Transfer::try_from)
            .collect()
    }
}
