use diesel::prelude::*;
use rust_decimal_macros::dec;

use cambio_core::balances::{BalanceService, NewInitialBalance};
use cambio_core::external_ops::{ExternalOperationService, NewExternalOperation};
use cambio_core::ledger::{LedgerService, NewAdjustment, SettlementChannel};
use cambio_core::reconciliation::ReconciliationService;
use cambio_core::MovementKind;

mod common;

/// Initial 100, then +50 INGRESO, -30 EGRESO, +10 AJUSTE.
fn seed_history(ctx: &common::TestContext, location_id: &str, currency_id: &str) {
    BalanceService::new(ctx.pool.clone())
        .assign_initial_balance(NewInitialBalance {
            location_id: location_id.to_string(),
            currency_id: currency_id.to_string(),
            amount: dec!(100),
            assigned_by: "manager".to_string(),
            note: None,
        })
        .unwrap();

    let ops = ExternalOperationService::new(ctx.pool.clone());
    ops.record_operation(NewExternalOperation {
        location_id: location_id.to_string(),
        currency_id: currency_id.to_string(),
        direction: MovementKind::Ingreso,
        amount: dec!(50),
        channel: SettlementChannel::Cash,
        agency: "Western Union".to_string(),
        reference: None,
        description: None,
        created_by: "cashier".to_string(),
    })
    .unwrap();
    ops.record_operation(NewExternalOperation {
        location_id: location_id.to_string(),
        currency_id: currency_id.to_string(),
        direction: MovementKind::Egreso,
        amount: dec!(30),
        channel: SettlementChannel::Cash,
        agency: "Western Union".to_string(),
        reference: None,
        description: None,
        created_by: "cashier".to_string(),
    })
    .unwrap();

    LedgerService::new(ctx.pool.clone())
        .record_adjustment(NewAdjustment {
            location_id: location_id.to_string(),
            currency_id: currency_id.to_string(),
            amount: dec!(10),
            channel: SettlementChannel::Cash,
            user_id: "auditor".to_string(),
            description: None,
        })
        .unwrap();
}

fn corrupt_stored_balance(ctx: &common::TestContext, for_location: &str, for_currency: &str) {
    use cambio_core::schema::balances::dsl::*;
    let mut conn = cambio_core::db::get_connection(&ctx.pool).unwrap();
    diesel::update(
        balances
            .filter(location_id.eq(for_location))
            .filter(currency_id.eq(for_currency)),
    )
    .set(amount.eq("200"))
    .execute(&mut conn)
    .unwrap();
}

#[test]
fn clean_pair_shows_no_drift() {
    let ctx = common::setup();
    let (central, _) = common::seed_locations(&ctx);
    let (usd, _) = common::seed_currencies(&ctx);
    seed_history(&ctx, &central, &usd);

    let service = ReconciliationService::new(ctx.pool.clone());
    let report = service.reconcile_pair(&central, &usd, false).unwrap();

    assert_eq!(report.initial, dec!(100));
    assert_eq!(report.total_ingresos, dec!(50));
    assert_eq!(report.total_egresos, dec!(-30));
    assert_eq!(report.total_ajustes, dec!(10));
    assert_eq!(report.recomputed, dec!(130));
    assert_eq!(report.stored, dec!(130));
    assert!(!report.has_drift());
}

#[test]
fn drift_is_reported_but_untouched_without_apply() {
    let ctx = common::setup();
    let (central, _) = common::seed_locations(&ctx);
    let (usd, _) = common::seed_currencies(&ctx);
    seed_history(&ctx, &central, &usd);
    corrupt_stored_balance(&ctx, &central, &usd);

    let service = ReconciliationService::new(ctx.pool.clone());
    let report = service.reconcile_pair(&central, &usd, false).unwrap();

    assert_eq!(report.stored, dec!(200));
    assert_eq!(report.recomputed, dec!(130));
    assert_eq!(report.drift, dec!(-70));
    assert!(!report.corrected);

    // Dry run: the stored amount keeps its bad value.
    assert_eq!(common::balance_of(&ctx, &central, &usd), dec!(200));
}

#[test]
fn apply_writes_a_corrective_adjustment_and_converges() {
    let ctx = common::setup();
    let (central, _) = common::seed_locations(&ctx);
    let (usd, _) = common::seed_currencies(&ctx);
    seed_history(&ctx, &central, &usd);
    corrupt_stored_balance(&ctx, &central, &usd);

    let service = ReconciliationService::new(ctx.pool.clone());
    let report = service.reconcile_pair(&central, &usd, true).unwrap();
    assert!(report.corrected);
    assert_eq!(common::balance_of(&ctx, &central, &usd), dec!(130));

    let correction = common::movements_of(&ctx, &central, &usd)
        .into_iter()
        .find(|m| m.source_kind == cambio_core::constants::SOURCE_KIND_RECONCILIATION)
        .unwrap();
    assert_eq!(correction.kind, MovementKind::Ajuste);
    assert_eq!(correction.amount, dec!(-70));

    // The correction is itself part of history, so a second run is clean.
    let second = service.reconcile_pair(&central, &usd, true).unwrap();
    assert!(!second.has_drift());
    assert!(!second.corrected);
}

#[test]
fn batch_covers_every_known_pair_and_stamps_the_run_id() {
    let ctx = common::setup();
    let (central, norte) = common::seed_locations(&ctx);
    let (usd, eur) = common::seed_currencies(&ctx);
    seed_history(&ctx, &central, &usd);
    seed_history(&ctx, &norte, &eur);
    corrupt_stored_balance(&ctx, &central, &usd);

    let service = ReconciliationService::new(ctx.pool.clone());
    let summary = service.reconcile_all(None, None, None, true).unwrap();

    assert_eq!(summary.pairs_checked, 2);
    assert_eq!(summary.pairs_with_drift, 1);
    assert_eq!(summary.corrections_applied, 1);
    assert_eq!(summary.pairs_failed, 0);
    assert!(summary.applied);

    let corrections = LedgerService::new(ctx.pool.clone())
        .get_movements_by_source(
            cambio_core::constants::SOURCE_KIND_RECONCILIATION,
            &summary.run_id,
        )
        .unwrap();
    assert_eq!(corrections.len(), 1);
}

#[test]
fn batch_respects_the_location_filter() {
    let ctx = common::setup();
    let (central, norte) = common::seed_locations(&ctx);
    let (usd, eur) = common::seed_currencies(&ctx);
    seed_history(&ctx, &central, &usd);
    seed_history(&ctx, &norte, &eur);
    corrupt_stored_balance(&ctx, &norte, &eur);

    let service = ReconciliationService::new(ctx.pool.clone());
    let summary = service.reconcile_all(Some(&central), None, None, true).unwrap();

    assert_eq!(summary.pairs_checked, 1);
    assert_eq!(summary.corrections_applied, 0);

    // The filtered-out branch keeps its drift.
    assert_eq!(common::balance_of(&ctx, &norte, &eur), dec!(200));
}

#[test]
fn sub_tolerance_differences_are_left_alone() {
    let ctx = common::setup();
    let (central, _) = common::seed_locations(&ctx);
    let (usd, _) = common::seed_currencies(&ctx);
    seed_history(&ctx, &central, &usd);

    {
        use cambio_core::schema::balances::dsl::*;
        let mut conn = cambio_core::db::get_connection(&ctx.pool).unwrap();
        diesel::update(
            balances
                .filter(location_id.eq(&central))
                .filter(currency_id.eq(&usd)),
        )
        .set(amount.eq("130.005"))
        .execute(&mut conn)
        .unwrap();
    }

    let service = ReconciliationService::new(ctx.pool.clone());
    let report = service.reconcile_pair(&central, &usd, true).unwrap();
    assert!(!report.corrected);
    assert!(!report.has_drift());
}
