use rust_decimal_macros::dec;

use cambio_core::exchanges::{ExchangeError, ExchangeService, ExchangeStatus, NewExchange};
use cambio_core::ledger::{LedgerService, NewAdjustment, SettlementChannel};
use cambio_core::MovementKind;

mod common;

fn fund_bank(ctx: &common::TestContext, location_id: &str, currency_id: &str, amount: rust_decimal::Decimal) {
    LedgerService::new(ctx.pool.clone())
        .record_adjustment(NewAdjustment {
            location_id: location_id.to_string(),
            currency_id: currency_id.to_string(),
            amount,
            channel: SettlementChannel::Bank,
            user_id: "seeder".to_string(),
            description: None,
        })
        .unwrap();
}

#[test]
fn full_exchange_credits_origin_and_debits_destination() {
    let ctx = common::setup();
    let (central, _) = common::seed_locations(&ctx);
    let (usd, eur) = common::seed_currencies(&ctx);
    common::fund(&ctx, &central, &eur, dec!(60));
    fund_bank(&ctx, &central, &eur, dec!(40));

    let service = ExchangeService::new(ctx.pool.clone());
    let exchange = service
        .create_exchange(NewExchange {
            location_id: central.clone(),
            origin_currency_id: usd.clone(),
            origin_cash: dec!(55),
            origin_bank: dec!(0),
            destination_currency_id: eur.clone(),
            destination_cash: dec!(40),
            destination_bank: dec!(10),
            initial_payment: None,
            customer_name: Some("Ana Pérez".to_string()),
            created_by: "cashier".to_string(),
        })
        .unwrap();

    assert_eq!(exchange.status, ExchangeStatus::Completado);
    assert_eq!(exchange.paid_amount, dec!(50));
    assert_eq!(exchange.pending_amount, dec!(0));

    assert_eq!(common::balance_of(&ctx, &central, &usd), dec!(55));
    assert_eq!(common::balance_of(&ctx, &central, &eur), dec!(50));

    // One INGRESO leg in USD, one EGRESO leg per destination channel.
    let legs = LedgerService::new(ctx.pool.clone())
        .get_movements_by_source(cambio_core::constants::SOURCE_KIND_EXCHANGE, &exchange.id)
        .unwrap();
    assert_eq!(legs.len(), 3);
    assert_eq!(
        legs.iter().filter(|m| m.kind == MovementKind::Egreso).count(),
        2
    );
}

#[test]
fn completing_a_completed_exchange_is_rejected_with_no_postings() {
    let ctx = common::setup();
    let (central, _) = common::seed_locations(&ctx);
    let (usd, eur) = common::seed_currencies(&ctx);
    common::fund(&ctx, &central, &eur, dec!(100));

    let service = ExchangeService::new(ctx.pool.clone());
    let exchange = service
        .create_exchange(NewExchange {
            location_id: central.clone(),
            origin_currency_id: usd.clone(),
            origin_cash: dec!(55),
            origin_bank: dec!(0),
            destination_currency_id: eur.clone(),
            destination_cash: dec!(50),
            destination_bank: dec!(0),
            initial_payment: None,
            customer_name: None,
            created_by: "cashier".to_string(),
        })
        .unwrap();
    assert_eq!(exchange.status, ExchangeStatus::Completado);

    let before = common::movements_of(&ctx, &central, &eur).len();
    let err = service.complete_exchange(&exchange.id, "cashier").unwrap_err();
    assert!(matches!(err, ExchangeError::AlreadyCompleted(_)));
    assert_eq!(common::movements_of(&ctx, &central, &eur).len(), before);
    assert_eq!(common::balance_of(&ctx, &central, &eur), dec!(50));
}

#[test]
fn partial_settlement_leaves_a_pending_balance() {
    let ctx = common::setup();
    let (central, _) = common::seed_locations(&ctx);
    let (usd, eur) = common::seed_currencies(&ctx);
    common::fund(&ctx, &central, &eur, dec!(100));

    let service = ExchangeService::new(ctx.pool.clone());
    let exchange = service
        .create_exchange(NewExchange {
            location_id: central.clone(),
            origin_currency_id: usd.clone(),
            origin_cash: dec!(55),
            origin_bank: dec!(0),
            destination_currency_id: eur.clone(),
            destination_cash: dec!(50),
            destination_bank: dec!(0),
            initial_payment: Some(dec!(20)),
            customer_name: Some("Luis Soto".to_string()),
            created_by: "cashier".to_string(),
        })
        .unwrap();

    // Abono inicial of 20 leaves a saldo pendiente of 30.
    assert_eq!(exchange.status, ExchangeStatus::Pendiente);
    assert_eq!(exchange.paid_amount, dec!(20));
    assert_eq!(exchange.pending_amount, dec!(30));
    assert_eq!(common::balance_of(&ctx, &central, &eur), dec!(80));

    let exchange = service.complete_exchange(&exchange.id, "cashier").unwrap();
    assert_eq!(exchange.status, ExchangeStatus::Completado);
    assert_eq!(exchange.paid_amount, dec!(50));
    assert_eq!(exchange.pending_amount, dec!(0));
    assert_eq!(common::balance_of(&ctx, &central, &eur), dec!(50));

    let err = service.complete_exchange(&exchange.id, "cashier").unwrap_err();
    assert!(matches!(err, ExchangeError::AlreadyCompleted(_)));
}

#[test]
fn settlement_consumes_destination_cash_before_bank() {
    let ctx = common::setup();
    let (central, _) = common::seed_locations(&ctx);
    let (usd, eur) = common::seed_currencies(&ctx);
    common::fund(&ctx, &central, &eur, dec!(40));
    fund_bank(&ctx, &central, &eur, dec!(60));

    let service = ExchangeService::new(ctx.pool.clone());
    // Destination 40 cash + 30 bank, abono 50: cash covers 40, bank 10.
    let exchange = service
        .create_exchange(NewExchange {
            location_id: central.clone(),
            origin_currency_id: usd.clone(),
            origin_cash: dec!(80),
            origin_bank: dec!(0),
            destination_currency_id: eur.clone(),
            destination_cash: dec!(40),
            destination_bank: dec!(30),
            initial_payment: Some(dec!(50)),
            customer_name: None,
            created_by: "cashier".to_string(),
        })
        .unwrap();

    let legs = LedgerService::new(ctx.pool.clone())
        .get_movements_by_source(cambio_core::constants::SOURCE_KIND_EXCHANGE, &exchange.id)
        .unwrap();
    let cash_egreso = legs
        .iter()
        .find(|m| m.kind == MovementKind::Egreso && m.channel == cambio_core::SettlementChannel::Cash)
        .unwrap();
    let bank_egreso = legs
        .iter()
        .find(|m| m.kind == MovementKind::Egreso && m.channel == cambio_core::SettlementChannel::Bank)
        .unwrap();
    assert_eq!(cash_egreso.amount, dec!(-40));
    assert_eq!(bank_egreso.amount, dec!(-10));

    // The residual 20 continues on the bank side.
    service.complete_exchange(&exchange.id, "cashier").unwrap();
    let legs = LedgerService::new(ctx.pool.clone())
        .get_movements_by_source(cambio_core::constants::SOURCE_KIND_EXCHANGE, &exchange.id)
        .unwrap();
    let bank_total: rust_decimal::Decimal = legs
        .iter()
        .filter(|m| m.kind == MovementKind::Egreso && m.channel == cambio_core::SettlementChannel::Bank)
        .map(|m| m.amount)
        .sum();
    assert_eq!(bank_total, dec!(-30));
}

#[test]
fn rejects_exchange_between_identical_currencies() {
    let ctx = common::setup();
    let (central, _) = common::seed_locations(&ctx);
    let (usd, _) = common::seed_currencies(&ctx);

    let service = ExchangeService::new(ctx.pool.clone());
    let result = service.create_exchange(NewExchange {
        location_id: central,
        origin_currency_id: usd.clone(),
        origin_cash: dec!(10),
        origin_bank: dec!(0),
        destination_currency_id: usd,
        destination_cash: dec!(10),
        destination_bank: dec!(0),
        initial_payment: None,
        customer_name: None,
        created_by: "cashier".to_string(),
    });
    assert!(matches!(result.unwrap_err(), ExchangeError::InvalidData(_)));
}
