use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::balances_model::{Balance, BalanceDB};
use super::{BalanceError, Result};
use crate::db::get_connection;
use crate::ledger::SettlementChannel;
use crate::schema::balances;
use crate::schema::balances::dsl::*;

/// Repository for the materialized balance rows.
///
/// The write path (`apply`) is connection-level only: it must run inside
/// the same transaction as the movement append that produced the new
/// amount, and `ledger::posting::post_movement` is its only caller.
pub struct BalanceRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl BalanceRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Current balance row for a pair, if one exists. Runs inside the
    /// caller's transaction.
    pub fn get_pair(
        conn: &mut SqliteConnection,
        for_location: &str,
        for_currency: &str,
    ) -> Result<Option<Balance>> {
        let row = balances
            .filter(location_id.eq(for_location))
            .filter(currency_id.eq(for_currency))
            .first::<BalanceDB>(conn)
            .optional()?;

        row.map(Balance::try_from).transpose()
    }

    /// Materializer upsert: overwrite the pair's amount and move the given
    /// settlement channel's split by `channel_delta`. Creates the row on
    /// first use.
    pub(crate) fn apply(
        conn: &mut SqliteConnection,
        for_location: &str,
        for_currency: &str,
        new_amount: Decimal,
        channel: SettlementChannel,
        channel_delta: Decimal,
    ) -> Result<()> {
        let existing = Self::get_pair(conn, for_location, for_currency)?;

        match existing {
            Some(balance) => {
                let (new_cash, new_bank) = match channel {
                    SettlementChannel::Cash => {
                        (balance.cash_amount + channel_delta, balance.bank_amount)
                    }
                    SettlementChannel::Bank => {
                        (balance.cash_amount, balance.bank_amount + channel_delta)
                    }
                };

                diesel::update(balances.find(&balance.id))
                    .set((
                        amount.eq(new_amount.to_string()),
                        cash_amount.eq(new_cash.to_string()),
                        bank_amount.eq(new_bank.to_string()),
                        updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .execute(conn)?;
            }
            None => {
                let (initial_cash, initial_bank) = match channel {
                    SettlementChannel::Cash => (channel_delta, Decimal::ZERO),
                    SettlementChannel::Bank => (Decimal::ZERO, channel_delta),
                };

                let row = BalanceDB {
                    id: uuid::Uuid::new_v4().to_string(),
                    location_id: for_location.to_string(),
                    currency_id: for_currency.to_string(),
                    amount: new_amount.to_string(),
                    cash_amount: initial_cash.to_string(),
                    coin_amount: Decimal::ZERO.to_string(),
                    bank_amount: initial_bank.to_string(),
                    updated_at: Utc::now().naive_utc(),
                };

                diesel::insert_into(balances::table)
                    .values(&row)
                    .execute(conn)?;
            }
        }

        Ok(())
    }

    /// Redistributes physical cash between notes and coins without touching
    /// the total. The end-of-day count workflow's only write hook.
    pub fn update_cash_split(
        conn: &mut SqliteConnection,
        for_location: &str,
        for_currency: &str,
        notes: Decimal,
        coins: Decimal,
    ) -> Result<Balance> {
        let balance = Self::get_pair(conn, for_location, for_currency)?.ok_or_else(|| {
            BalanceError::NotFound(format!(
                "No balance for location {} currency {}",
                for_location, for_currency
            ))
        })?;

        let current_physical = balance.cash_amount + balance.coin_amount;
        if (notes + coins - current_physical).abs() > crate::ledger::ledger_model::balance_tolerance()
        {
            return Err(BalanceError::InvalidData(format!(
                "Cash split {} + {} does not preserve the physical total {}",
                notes, coins, current_physical
            )));
        }

        diesel::update(balances.find(&balance.id))
            .set((
                cash_amount.eq(notes.to_string()),
                coin_amount.eq(coins.to_string()),
                updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(conn)?;

        balances
            .find(&balance.id)
            .first::<BalanceDB>(conn)
            .map_err(BalanceError::from)
            .and_then(Balance::try_from)
    }

    /// Every (location, currency) pair that has a materialized row.
    pub fn distinct_pairs(conn: &mut SqliteConnection) -> Result<Vec<(String, String)>> {
        balances
            .select((location_id, currency_id))
            .distinct()
            .load::<(String, String)>(conn)
            .map_err(BalanceError::from)
    }

    pub fn get_balance(&self, for_location: &str, for_currency: &str) -> Result<Balance> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| BalanceError::DatabaseError(e.to_string()))?;

        Self::get_pair(&mut conn, for_location, for_currency)?.ok_or_else(|| {
            BalanceError::NotFound(format!(
                "No balance for location {} currency {}",
                for_location, for_currency
            ))
        })
    }

    pub fn list(&self, location_filter: Option<&str>) -> Result<Vec<Balance>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| BalanceError::DatabaseError(e.to_string()))?;

        let mut query = balances.into_boxed();
        if let Some(loc) = location_filter {
            query = query.filter(location_id.eq(loc.to_string()));
        }

        query
            .order((location_id.asc(), currency_id.asc()))
            .load::<BalanceDB>(&mut conn)?
            .into_iter()
            .map(Balance::try_from)
            .collect()
    }
}
