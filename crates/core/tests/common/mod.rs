#![allow(dead_code)]

use std::sync::Arc;

use rust_decimal::Decimal;
use tempfile::TempDir;

use cambio_core::balances::BalanceService;
use cambio_core::currencies::CurrencyService;
use cambio_core::currencies::NewCurrency;
use cambio_core::db::{self, DbPool};
use cambio_core::ledger::{LedgerService, MovementQuery, NewAdjustment, SettlementChannel};
use cambio_core::locations::{LocationService, NewLocation};
use cambio_core::Movement;

/// A throwaway database in a temp directory, dropped with the context.
pub struct TestContext {
    pub pool: Arc<DbPool>,
    _temp_dir: TempDir,
}

pub fn setup() -> TestContext {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = temp_dir
        .path()
        .join("cambio.db")
        .to_string_lossy()
        .to_string();

    let pool = db::create_pool(&db_path).expect("Failed to create database pool");
    db::run_migrations(&pool).expect("Failed to run migrations");

    TestContext {
        pool,
        _temp_dir: temp_dir,
    }
}

/// Two branches, ready for transfers between them.
pub fn seed_locations(ctx: &TestContext) -> (String, String) {
    let service = LocationService::new(ctx.pool.clone());
    let central = service
        .create_location(NewLocation {
            id: None,
            name: "Central".to_string(),
        })
        .expect("Failed to create location");
    let norte = service
        .create_location(NewLocation {
            id: None,
            name: "Norte".to_string(),
        })
        .expect("Failed to create location");
    (central.id, norte.id)
}

pub fn seed_currencies(ctx: &TestContext) -> (String, String) {
    let service = CurrencyService::new(ctx.pool.clone());
    let usd = service
        .create_currency(NewCurrency {
            id: None,
            code: "USD".to_string(),
            symbol: "$".to_string(),
            display_order: 1,
        })
        .expect("Failed to create currency");
    let eur = service
        .create_currency(NewCurrency {
            id: None,
            code: "EUR".to_string(),
            symbol: "€".to_string(),
            display_order: 2,
        })
        .expect("Failed to create currency");
    (usd.id, eur.id)
}

/// Seeds a pair with funds through a positive cash adjustment.
pub fn fund(ctx: &TestContext, location_id: &str, currency_id: &str, amount: Decimal) {
    let service = LedgerService::new(ctx.pool.clone());
    service
        .record_adjustment(NewAdjustment {
            location_id: location_id.to_string(),
            currency_id: currency_id.to_string(),
            amount,
            channel: SettlementChannel::Cash,
            user_id: "seeder".to_string(),
            description: Some("Seed funds".to_string()),
        })
        .expect("Failed to seed funds");
}

pub fn balance_of(ctx: &TestContext, location_id: &str, currency_id: &str) -> Decimal {
    BalanceService::new(ctx.pool.clone())
        .get_balance(location_id, currency_id)
        .expect("Failed to read balance")
        .amount
}

pub fn movements_of(ctx: &TestContext, location_id: &str, currency_id: &str) -> Vec<Movement> {
    LedgerService::new(ctx.pool.clone())
        .get_movements(&MovementQuery {
            location_id: Some(location_id.to_string()),
            currency_id: Some(currency_id.to_string()),
            from: None,
            to: None,
        })
        .expect("Failed to load movements")
}
