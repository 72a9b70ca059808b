use diesel::prelude::*;
use rust_decimal_macros::dec;

use cambio_core::ledger::{
    LedgerError, LedgerRepository, LedgerService, MovementDB, NewAdjustment, SettlementChannel,
};
use cambio_core::MovementKind;

mod common;

fn raw_movement(
    location_id: &str,
    currency_id: &str,
    kind: &str,
    amount: &str,
    prior_balance: &str,
    new_balance: &str,
) -> MovementDB {
    MovementDB {
        id: uuid::Uuid::new_v4().to_string(),
        location_id: location_id.to_string(),
        currency_id: currency_id.to_string(),
        kind: kind.to_string(),
        amount: amount.to_string(),
        prior_balance: prior_balance.to_string(),
        new_balance: new_balance.to_string(),
        channel: "CASH".to_string(),
        user_id: "cashier".to_string(),
        source_kind: cambio_core::constants::SOURCE_KIND_MANUAL_ADJUSTMENT.to_string(),
        source_id: None,
        description: None,
        created_at: chrono::Utc::now().naive_utc(),
    }
}

#[test]
fn adjustments_chain_prior_and_new_balance() {
    let ctx = common::setup();
    let (central, _) = common::seed_locations(&ctx);
    let (usd, _) = common::seed_currencies(&ctx);

    let service = LedgerService::new(ctx.pool.clone());
    service
        .record_adjustment(NewAdjustment {
            location_id: central.clone(),
            currency_id: usd.clone(),
            amount: dec!(1000),
            channel: SettlementChannel::Cash,
            user_id: "cashier".to_string(),
            description: None,
        })
        .unwrap();
    service
        .record_adjustment(NewAdjustment {
            location_id: central.clone(),
            currency_id: usd.clone(),
            amount: dec!(-250),
            channel: SettlementChannel::Cash,
            user_id: "cashier".to_string(),
            description: None,
        })
        .unwrap();

    let movements = common::movements_of(&ctx, &central, &usd);
    assert_eq!(movements.len(), 2);
    for m in &movements {
        assert_eq!(m.new_balance, m.prior_balance + m.amount);
    }
    let debit = movements.iter().find(|m| m.amount == dec!(-250)).unwrap();
    assert_eq!(debit.prior_balance, dec!(1000));
    assert_eq!(debit.new_balance, dec!(750));
    assert_eq!(common::balance_of(&ctx, &central, &usd), dec!(750));
}

#[test]
fn negative_adjustment_may_overdraw() {
    let ctx = common::setup();
    let (central, _) = common::seed_locations(&ctx);
    let (usd, _) = common::seed_currencies(&ctx);

    let service = LedgerService::new(ctx.pool.clone());
    service
        .record_adjustment(NewAdjustment {
            location_id: central.clone(),
            currency_id: usd.clone(),
            amount: dec!(-40),
            channel: SettlementChannel::Cash,
            user_id: "auditor".to_string(),
            description: Some("Shortage found at count".to_string()),
        })
        .unwrap();

    assert_eq!(common::balance_of(&ctx, &central, &usd), dec!(-40));
}

#[test]
fn rejects_zero_amount_adjustment() {
    let ctx = common::setup();
    let (central, _) = common::seed_locations(&ctx);
    let (usd, _) = common::seed_currencies(&ctx);

    let service = LedgerService::new(ctx.pool.clone());
    let result = service.record_adjustment(NewAdjustment {
        location_id: central,
        currency_id: usd,
        amount: dec!(0),
        channel: SettlementChannel::Cash,
        user_id: "cashier".to_string(),
        description: None,
    });
    assert!(result.is_err());
}

#[test]
fn storage_boundary_rejects_disagreeing_balance_snapshots() {
    let ctx = common::setup();
    let (central, _) = common::seed_locations(&ctx);
    let (usd, _) = common::seed_currencies(&ctx);
    let mut conn = cambio_core::db::get_connection(&ctx.pool).unwrap();

    // 0 + 10 != 50.
    let entry = raw_movement(&central, &usd, "AJUSTE", "10", "0", "50");
    let err = LedgerRepository::insert(&mut conn, &entry).unwrap_err();
    assert!(matches!(err, LedgerError::InvariantViolation(_)));

    assert!(common::movements_of(&ctx, &central, &usd).is_empty());
}

#[test]
fn storage_boundary_rejects_sign_kind_contradictions() {
    let ctx = common::setup();
    let (central, _) = common::seed_locations(&ctx);
    let (usd, _) = common::seed_currencies(&ctx);
    let mut conn = cambio_core::db::get_connection(&ctx.pool).unwrap();

    // Arithmetic is consistent in both; only the sign convention is broken.
    let positive_egreso = raw_movement(&central, &usd, "EGRESO", "25", "100", "125");
    let err = LedgerRepository::insert(&mut conn, &positive_egreso).unwrap_err();
    assert!(matches!(err, LedgerError::InvariantViolation(_)));

    let negative_ingreso = raw_movement(&central, &usd, "INGRESO", "-25", "100", "75");
    let err = LedgerRepository::insert(&mut conn, &negative_ingreso).unwrap_err();
    assert!(matches!(err, LedgerError::InvariantViolation(_)));

    assert!(common::movements_of(&ctx, &central, &usd).is_empty());
}

#[test]
fn normalization_counts_then_repairs_misfiled_signs() {
    let ctx = common::setup();
    let (central, _) = common::seed_locations(&ctx);
    let (usd, _) = common::seed_currencies(&ctx);

    common::fund(&ctx, &central, &usd, dec!(500));

    let ops = cambio_core::external_ops::ExternalOperationService::new(ctx.pool.clone());
    let ingreso = ops
        .record_operation(cambio_core::external_ops::NewExternalOperation {
            location_id: central.clone(),
            currency_id: usd.clone(),
            direction: MovementKind::Ingreso,
            amount: dec!(120),
            channel: SettlementChannel::Cash,
            agency: "MoneyGram".to_string(),
            reference: None,
            description: None,
            created_by: "cashier".to_string(),
        })
        .unwrap();

    // Corrupt the stored sign the way legacy imports used to.
    {
        use cambio_core::schema::movements::dsl::*;
        let mut conn = cambio_core::db::get_connection(&ctx.pool).unwrap();
        diesel::update(movements.filter(source_id.eq(&ingreso.id)))
            .set(amount.eq("-120"))
            .execute(&mut conn)
            .unwrap();
    }

    let service = LedgerService::new(ctx.pool.clone());

    // The seed adjustment is not subject to the sign convention.
    let preview = service.normalize_signs(None, None, None, false).unwrap();
    assert_eq!(preview.scanned, 1);
    assert_eq!(preview.misfiled_ingresos, 1);
    assert_eq!(preview.misfiled_egresos, 0);
    assert!(!preview.applied);

    // Preview must not write anything.
    let still_misfiled = common::movements_of(&ctx, &central, &usd)
        .into_iter()
        .filter(|m| m.kind == MovementKind::Ingreso && m.amount < dec!(0))
        .count();
    assert_eq!(still_misfiled, 1);

    let repair = service.normalize_signs(None, None, None, true).unwrap();
    assert_eq!(repair.total_misfiled(), 1);
    assert!(repair.applied);

    let repaired = common::movements_of(&ctx, &central, &usd);
    assert!(repaired
        .iter()
        .filter(|m| m.kind == MovementKind::Ingreso)
        .all(|m| m.amount > dec!(0)));

    // Idempotent once clean.
    let second = service.normalize_signs(None, None, None, true).unwrap();
    assert_eq!(second.total_misfiled(), 0);
}

#[test]
fn normalization_respects_location_filter() {
    let ctx = common::setup();
    let (central, norte) = common::seed_locations(&ctx);
    let (usd, _) = common::seed_currencies(&ctx);

    common::fund(&ctx, &central, &usd, dec!(100));
    common::fund(&ctx, &norte, &usd, dec!(100));

    let ops = cambio_core::external_ops::ExternalOperationService::new(ctx.pool.clone());
    for loc in [&central, &norte] {
        ops.record_operation(cambio_core::external_ops::NewExternalOperation {
            location_id: loc.clone(),
            currency_id: usd.clone(),
            direction: MovementKind::Egreso,
            amount: dec!(10),
            channel: SettlementChannel::Cash,
            agency: "Western Union".to_string(),
            reference: None,
            description: None,
            created_by: "cashier".to_string(),
        })
        .unwrap();
    }

    // Misfile both branches' egresos.
    {
        use cambio_core::schema::movements::dsl::*;
        let mut conn = cambio_core::db::get_connection(&ctx.pool).unwrap();
        diesel::update(movements.filter(kind.eq("EGRESO")))
            .set(amount.eq("10"))
            .execute(&mut conn)
            .unwrap();
    }

    let service = LedgerService::new(ctx.pool.clone());
    let report = service.normalize_signs(Some(&central), None, None, true).unwrap();
    assert_eq!(report.misfiled_egresos, 1);

    // The other branch is untouched.
    let norte_misfiled = common::movements_of(&ctx, &norte, &usd)
        .into_iter()
        .filter(|m| m.kind == MovementKind::Egreso && m.amount > dec!(0))
        .count();
    assert_eq!(norte_misfiled, 1);
}
