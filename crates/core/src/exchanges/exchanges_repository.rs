use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::exchanges_model::{Exchange, ExchangeDB, ExchangeStatus};
use super::{ExchangeError, Result};
use crate::db::get_connection;
use crate::schema::exchanges;
use crate::schema::exchanges::dsl::*;

pub struct ExchangeRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl ExchangeRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    pub fn insert(conn: &mut SqliteConnection, row: &ExchangeDB) -> Result<Exchange> {
        diesel::insert_into(exchanges::table)
            .values(row)
            .execute(conn)?;
        Exchange::try_from(row.clone())
    }

    pub fn get(conn: &mut SqliteConnection, exchange_id: &str) -> Result<Exchange> {
        let row = exchanges
            .find(exchange_id)
            .first::<ExchangeDB>(conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    ExchangeError::NotFound(format!("Exchange with id {} not found", exchange_id))
                }
                _ => ExchangeError::DatabaseError(e.to_string()),
            })?;

        Exchange::try_from(row)
    }

    pub fn mark_settled(
        conn: &mut SqliteConnection,
        exchange_id: &str,
        new_paid: Decimal,
        new_pending: Decimal,
        new_status: ExchangeStatus,
    ) -> Result<()> {
        diesel::update(exchanges.find(exchange_id))
            .set((
                paid_amount.eq(new_paid.to_string()),
                pending_amount.eq(new_pending.to_string()),
                status.eq(new_status.as_str()),
                updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(conn)?;
        Ok(())
    }

    pub fn get_by_id(&self, exchange_id: &str) -> Result<Exchange> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| ExchangeError::DatabaseError(e.to_string()))?;
        Self::get(&mut conn, exchange_id)
    }

    pub fn list(&self, status_filter: Option<ExchangeStatus>) -> Result<Vec<Exchange>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| ExchangeError::DatabaseError(e.to_string()))?;

        let mut query = exchanges.into_boxed();
        if let Some(s) = status_filter {
            query = query.filter(status.eq(s.as_str()));
        }

        query
            .order(created_at.desc())
            .load::<ExchangeDB>(&mut conn)?
            .into_iter()
            .map(Exchange::try_from)
            .collect()
    }
}
