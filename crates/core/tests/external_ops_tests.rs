use rust_decimal_macros::dec;

use cambio_core::external_ops::{
    ExternalOperationError, ExternalOperationService, NewExternalOperation,
};
use cambio_core::ledger::{LedgerError, LedgerService, SettlementChannel};
use cambio_core::MovementKind;

mod common;

fn payout(location_id: &str, currency_id: &str, amount: rust_decimal::Decimal) -> NewExternalOperation {
    NewExternalOperation {
        location_id: location_id.to_string(),
        currency_id: currency_id.to_string(),
        direction: MovementKind::Egreso,
        amount,
        channel: SettlementChannel::Cash,
        agency: "Western Union".to_string(),
        reference: Some("WU-7781".to_string()),
        description: None,
        created_by: "cashier".to_string(),
    }
}

#[test]
fn recorded_operation_posts_its_movement() {
    let ctx = common::setup();
    let (central, _) = common::seed_locations(&ctx);
    let (usd, _) = common::seed_currencies(&ctx);

    let service = ExternalOperationService::new(ctx.pool.clone());
    let operation = service
        .record_operation(NewExternalOperation {
            location_id: central.clone(),
            currency_id: usd.clone(),
            direction: MovementKind::Ingreso,
            amount: dec!(250),
            channel: SettlementChannel::Cash,
            agency: "MoneyGram".to_string(),
            reference: None,
            description: None,
            created_by: "cashier".to_string(),
        })
        .unwrap();

    assert_eq!(common::balance_of(&ctx, &central, &usd), dec!(250));

    let legs = LedgerService::new(ctx.pool.clone())
        .get_movements_by_source(
            cambio_core::constants::SOURCE_KIND_EXTERNAL_SERVICE,
            &operation.id,
        )
        .unwrap();
    assert_eq!(legs.len(), 1);
    assert_eq!(legs[0].kind, MovementKind::Ingreso);
    assert_eq!(legs[0].amount, dec!(250));
}

#[test]
fn overdrawing_disbursement_is_rejected_atomically() {
    let ctx = common::setup();
    let (central, _) = common::seed_locations(&ctx);
    let (usd, _) = common::seed_currencies(&ctx);
    common::fund(&ctx, &central, &usd, dec!(100));

    let service = ExternalOperationService::new(ctx.pool.clone());
    let err = service.record_operation(payout(&central, &usd, dec!(150))).unwrap_err();
    assert!(matches!(
        err,
        ExternalOperationError::Ledger(LedgerError::InsufficientBalance { .. })
    ));

    // The business record rolled back with the posting.
    assert!(service.list_operations(Some(&central), None).unwrap().is_empty());
    assert_eq!(common::balance_of(&ctx, &central, &usd), dec!(100));
}

#[test]
fn listing_filters_by_agency() {
    let ctx = common::setup();
    let (central, _) = common::seed_locations(&ctx);
    let (usd, _) = common::seed_currencies(&ctx);
    common::fund(&ctx, &central, &usd, dec!(1000));

    let service = ExternalOperationService::new(ctx.pool.clone());
    service.record_operation(payout(&central, &usd, dec!(80))).unwrap();
    let mut other = payout(&central, &usd, dec!(60));
    other.agency = "MoneyGram".to_string();
    service.record_operation(other).unwrap();

    let wu = service
        .list_operations(Some(&central), Some("Western Union"))
        .unwrap();
    assert_eq!(wu.len(), 1);
    assert_eq!(wu[0].amount, dec!(80));

    let all = service.list_operations(Some(&central), None).unwrap();
    assert_eq!(all.len(), 2);
}
