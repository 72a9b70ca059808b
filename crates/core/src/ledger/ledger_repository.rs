use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::ledger_model::{balance_tolerance, parse_stored_decimal, Movement, MovementDB};
use super::ledger_model::{MovementKind, MovementQuery};
use super::{LedgerError, Result};
use crate::db::get_connection;
use crate::schema::movements;
use crate::schema::movements::dsl::*;

/// Repository for the append-only movement ledger.
///
/// There are deliberately no update or delete functions here: corrections
/// are new AJUSTE entries. The single exception is the sign normalizer
/// (`ledger::normalizer`), a historical repair pass.
pub struct LedgerRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl LedgerRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Appends a movement after re-validating the ledger invariants at the
    /// storage boundary. Runs inside the caller's transaction.
    pub fn insert(conn: &mut SqliteConnection, movement_db: &MovementDB) -> Result<()> {
        let signed_amount = parse_stored_decimal(&movement_db.amount)?;
        let prior = parse_stored_decimal(&movement_db.prior_balance)?;
        let new = parse_stored_decimal(&movement_db.new_balance)?;

        match movement_db.kind.parse::<MovementKind>() {
            Ok(MovementKind::Ingreso) if signed_amount <= rust_decimal::Decimal::ZERO => {
                return Err(LedgerError::InvariantViolation(format!(
                    "INGRESO must carry a positive amount, got {}",
                    signed_amount
                )));
            }
            Ok(MovementKind::Egreso) if signed_amount >= rust_decimal::Decimal::ZERO => {
                return Err(LedgerError::InvariantViolation(format!(
                    "EGRESO must carry a negative amount, got {}",
                    signed_amount
                )));
            }
            Ok(_) => {}
            Err(e) => return Err(LedgerError::InvalidData(e)),
        }

        if (new - prior - signed_amount).abs() > balance_tolerance() {
            return Err(LedgerError::InvariantViolation(format!(
                "Balance snapshots disagree with amount: {} - {} != {}",
                new, prior, signed_amount
            )));
        }

        diesel::insert_into(movements::table)
            .values(movement_db)
            .execute(conn)?;

        Ok(())
    }

    /// Time-ordered movements for one (location, currency) pair, optionally
    /// bounded by a date range. Runs inside the caller's transaction.
    pub fn query_pair(
        conn: &mut SqliteConnection,
        for_location: &str,
        for_currency: &str,
        from: Option<chrono::NaiveDateTime>,
        to: Option<chrono::NaiveDateTime>,
    ) -> Result<Vec<Movement>> {
        let mut query = movements
            .filter(location_id.eq(for_location))
            .filter(currency_id.eq(for_currency))
            .into_boxed();

        if let Some(from_ts) = from {
            query = query.filter(created_at.ge(from_ts));
        }
        if let Some(to_ts) = to {
            query = query.filter(created_at.le(to_ts));
        }

        query
            .order((created_at.asc(), id.asc()))
            .load::<MovementDB>(conn)?
            .into_iter()
            .map(Movement::try_from)
            .collect()
    }

    /// Every (location, currency) pair that has ledger history.
    pub fn distinct_pairs(conn: &mut SqliteConnection) -> Result<Vec<(String, String)>> {
        movements
            .select((location_id, currency_id))
            .distinct()
            .load::<(String, String)>(conn)
            .map_err(LedgerError::from)
    }

    pub fn get_movements(&self, filter: &MovementQuery) -> Result<Vec<Movement>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| LedgerError::DatabaseError(e.to_string()))?;

        let mut query = movements.into_boxed();
        if let Some(ref loc) = filter.location_id {
            query = query.filter(location_id.eq(loc.clone()));
        }
        if let Some(ref cur) = filter.currency_id {
            query = query.filter(currency_id.eq(cur.clone()));
        }
        if let Some(from_ts) = filter.from {
            query = query.filter(created_at.ge(from_ts));
        }
        if let Some(to_ts) = filter.to {
            query = query.filter(created_at.le(to_ts));
        }

        query
            .order((created_at.asc(), id.asc()))
            .load::<MovementDB>(&mut conn)?
            .into_iter()
            .map(Movement::try_from)
            .collect()
    }

    /// Movements stamped with a given source, e.g. all legs of a transfer.
    pub fn get_movements_by_source(
        &self,
        for_source_kind: &str,
        for_source_id: &str,
    ) -> Result<Vec<Movement>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| LedgerError::DatabaseError(e.to_string()))?;

        movements
            .filter(source_kind.eq(for_source_kind))
            .filter(source_id.eq(for_source_id))
            .order((created_at.asc(), id.asc()))
            .load::<MovementDB>(&mut conn)?
            .into_iter()
            .map(Movement::try_from)
            .collect()
    }
}
