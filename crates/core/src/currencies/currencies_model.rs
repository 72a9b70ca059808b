use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::currencies_errors::CurrencyError;
use super::Result;

/// Domain model for a currency handled at the counters
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub id: String,
    pub code: String,
    pub symbol: String,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCurrency {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub code: String,
    pub symbol: String,
    pub display_order: i32,
}

impl NewCurrency {
    pub fn validate(&self) -> Result<()> {
        if self.code.trim().is_empty() {
            return Err(CurrencyError::InvalidData(
                "Currency code cannot be empty".to_string(),
            ));
        }
        if self.code.trim().len() > 5 {
            return Err(CurrencyError::InvalidData(format!(
                "Currency code '{}' is too long",
                self.code
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyUpdate {
    pub id: String,
    pub symbol: String,
    pub display_order: i32,
    pub is_active: bool,
}

/// Database model for currencies
#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::currencies)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CurrencyDB {
    pub id: String,
    pub code: String,
    pub symbol: String,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<CurrencyDB> for Currency {
    fn from(db: CurrencyDB) -> Self {
        Self {
            id: db.id,
            code: db.code,
            symbol: db.symbol,
            display_order: db.display_order,
            is_active: db.is_active,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewCurrency> for CurrencyDB {
    fn from(new: NewCurrency) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: new.id.unwrap_or_default(),
            code: new.code.trim().to_uppercase(),
            symbol: new.symbol,
            display_order: new.display_order,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
