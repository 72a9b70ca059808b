use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::currencies_model::{Currency, CurrencyDB, CurrencyUpdate, NewCurrency};
use super::{CurrencyError, Result};
use crate::db::get_connection;
use crate::schema::currencies;
use crate::schema::currencies::dsl::*;

pub struct CurrencyRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl CurrencyRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    pub fn create(&self, new_currency: NewCurrency) -> Result<Currency> {
        new_currency.validate()?;

        let mut currency_db: CurrencyDB = new_currency.into();
        if currency_db.id.is_empty() {
            currency_db.id = uuid::Uuid::new_v4().to_string();
        }

        let mut conn = get_connection(&self.pool)
            .map_err(|e| CurrencyError::DatabaseError(e.to_string()))?;

        diesel::insert_into(currencies::table)
            .values(&currency_db)
            .execute(&mut conn)?;

        Ok(currency_db.into())
    }

    pub fn update(&self, update: CurrencyUpdate) -> Result<Currency> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| CurrencyError::DatabaseError(e.to_string()))?;

        let mut currency_db = currencies
            .find(&update.id)
            .first::<CurrencyDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    CurrencyError::NotFound(format!("Currency with id {} not found", update.id))
                }
                _ => CurrencyError::DatabaseError(e.to_string()),
            })?;

        currency_db.symbol = update.symbol;
        currency_db.display_order = update.display_order;
        currency_db.is_active = update.is_active;
        currency_db.updated_at = chrono::Utc::now().naive_utc();

        diesel::update(currencies.find(&currency_db.id))
            .set(&currency_db)
            .execute(&mut conn)?;

        Ok(currency_db.into())
    }

    pub fn get_by_id(&self, currency_id: &str) -> Result<Currency> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| CurrencyError::DatabaseError(e.to_string()))?;

        let currency = currencies
            .find(currency_id)
            .first::<CurrencyDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    CurrencyError::NotFound(format!("Currency with id {} not found", currency_id))
                }
                _ => CurrencyError::DatabaseError(e.to_string()),
            })?;

        Ok(currency.into())
    }

    pub fn get_by_code(&self, currency_code: &str) -> Result<Currency> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| CurrencyError::DatabaseError(e.to_string()))?;

        let currency = currencies
            .filter(code.eq(currency_code.to_uppercase()))
            .first::<CurrencyDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    CurrencyError::NotFound(format!("Currency '{}' not found", currency_code))
                }
                _ => CurrencyError::DatabaseError(e.to_string()),
            })?;

        Ok(currency.into())
    }

    pub fn list(&self, is_active_filter: Option<bool>) -> Result<Vec<Currency>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| CurrencyError::DatabaseError(e.to_string()))?;

        let mut query = currencies.into_boxed();
        if let Some(active) = is_active_filter {
            query = query.filter(is_active.eq(active));
        }

        query
            .order(display_order.asc())
            .load::<CurrencyDB>(&mut conn)
            .map(|rows| rows.into_iter().map(Currency::from).collect())
            .map_err(CurrencyError::from)
    }
}
