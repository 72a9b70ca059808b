use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::currencies_model::{Currency, CurrencyUpdate, NewCurrency};
use super::currencies_repository::CurrencyRepository;
use super::Result;

/// Service for managing the currency registry
pub struct CurrencyService {
    repository: CurrencyRepository,
}

impl CurrencyService {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self {
            repository: CurrencyRepository::new(pool),
        }
    }

    pub fn create_currency(&self, new_currency: NewCurrency) -> Result<Currency> {
        self.repository.create(new_currency)
    }

    pub fn update_currency(&self, update: CurrencyUpdate) -> Result<Currency> {
        self.repository.update(update)
    }

    pub fn get_currency(&self, currency_id: &str) -> Result<Currency> {
        self.repository.get_by_id(currency_id)
    }

    pub fn get_currency_by_code(&self, currency_code: &str) -> Result<Currency> {
        self.repository.get_by_code(currency_code)
    }

    pub fn list_currencies(&self, is_active_filter: Option<bool>) -> Result<Vec<Currency>> {
        self.repository.list(is_active_filter)
    }
}
