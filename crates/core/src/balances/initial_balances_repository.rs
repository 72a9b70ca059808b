use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::balances_model::{InitialBalance, InitialBalanceDB};
use super::{BalanceError, Result};
use crate::db::get_connection;
use crate::schema::initial_balances;
use crate::schema::initial_balances::dsl::*;

/// Repository for initial-balance assignments. Superseded rows are
/// deactivated, never deleted (audit trail).
pub struct InitialBalanceRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl InitialBalanceRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// The single active initial balance for a pair, if assigned.
    pub fn get_active(
        conn: &mut SqliteConnection,
        for_location: &str,
        for_currency: &str,
    ) -> Result<Option<InitialBalance>> {
        let row = initial_balances
            .filter(location_id.eq(for_location))
            .filter(currency_id.eq(for_currency))
            .filter(is_active.eq(true))
            .order(assigned_at.desc())
            .first::<InitialBalanceDB>(conn)
            .optional()?;

        row.map(InitialBalance::try_from).transpose()
    }

    pub fn deactivate_active(
        conn: &mut SqliteConnection,
        for_location: &str,
        for_currency: &str,
    ) -> Result<usize> {
        diesel::update(
            initial_balances
                .filter(location_id.eq(for_location))
                .filter(currency_id.eq(for_currency))
                .filter(is_active.eq(true)),
        )
        .set(is_active.eq(false))
        .execute(conn)
        .map_err(BalanceError::from)
    }

    pub fn insert(conn: &mut SqliteConnection, row: &InitialBalanceDB) -> Result<()> {
        diesel::insert_into(initial_balances::table)
            .values(row)
            .execute(conn)?;
        Ok(())
    }

    /// Every (location, currency) pair with an assignment, active or not.
    pub fn distinct_pairs(conn: &mut SqliteConnection) -> Result<Vec<(String, String)>> {
        initial_balances
            .select((location_id, currency_id))
            .distinct()
            .load::<(String, String)>(conn)
            .map_err(BalanceError::from)
    }

    /// Full assignment history for a pair, newest first.
    pub fn get_history(&self, for_location: &str, for_currency: &str) -> Result<Vec<InitialBalance>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| BalanceError::DatabaseError(e.to_string()))?;

        initial_balances
            .filter(location_id.eq(for_location))
            .filter(currency_id.eq(for_currency))
            .order(assigned_at.desc())
            .load::<InitialBalanceDB>(&mut conn)?
            .into_iter()
            .map(InitialBalance::try_from)
            .collect()
    }
}
