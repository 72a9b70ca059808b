use rust_decimal::Decimal;

use crate::ledger::{Movement, MovementKind};

/// Breakdown of a pair recomputation from first principles.
#[derive(Debug, Clone, PartialEq)]
pub struct Recomputed {
    pub initial: Decimal,
    pub total_ingresos: Decimal,
    pub total_egresos: Decimal,
    pub total_ajustes: Decimal,
    /// `initial + Σ signed amounts`, SALDO_INICIAL excluded.
    pub recomputed: Decimal,
}

/// The canonical recomputation: active initial balance plus the signed sum
/// of the pair's history, excluding SALDO_INICIAL markers (their amount is
/// already captured by the initial balance). This is the one and only
/// implementation; the online orchestrator's invariants and every offline
/// audit path compare against it.
pub fn recompute_pair(initial: Decimal, movements: &[Movement]) -> Recomputed {
    let mut total_ingresos = Decimal::ZERO;
    let mut total_egresos = Decimal::ZERO;
    let mut total_ajustes = Decimal::ZERO;

    for movement in movements {
        if !movement.kind.counts_in_recompute() {
            continue;
        }
        match movement.kind {
            MovementKind::Ingreso => total_ingresos += movement.amount,
            MovementKind::Egreso => total_egresos += movement.amount,
            MovementKind::Ajuste => total_ajustes += movement.amount,
            MovementKind::SaldoInicial => {}
        }
    }

    Recomputed {
        initial,
        total_ingresos,
        total_egresos,
        total_ajustes,
        recomputed: initial + total_ingresos + total_egresos + total_ajustes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SOURCE_KIND_MANUAL_ADJUSTMENT;
    use crate::ledger::SettlementChannel;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn movement(kind: MovementKind, amount: Decimal) -> Movement {
        Movement {
            id: uuid::Uuid::new_v4().to_string(),
            location_id: "loc".to_string(),
            currency_id: "usd".to_string(),
            kind,
            amount,
            prior_balance: Decimal::ZERO,
            new_balance: amount,
            channel: SettlementChannel::Cash,
            user_id: "tester".to_string(),
            source_kind: SOURCE_KIND_MANUAL_ADJUSTMENT.to_string(),
            source_id: None,
            description: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn recomputes_initial_plus_signed_history() {
        let movements = vec![
            movement(MovementKind::Ingreso, dec!(50.00)),
            movement(MovementKind::Egreso, dec!(-30.00)),
            movement(MovementKind::Ajuste, dec!(10.00)),
        ];

        let result = recompute_pair(dec!(100.00), &movements);

        assert_eq!(result.total_ingresos, dec!(50.00));
        assert_eq!(result.total_egresos, dec!(-30.00));
        assert_eq!(result.total_ajustes, dec!(10.00));
        assert_eq!(result.recomputed, dec!(130.00));
    }

    #[test]
    fn saldo_inicial_markers_do_not_double_count() {
        let movements = vec![
            movement(MovementKind::SaldoInicial, dec!(100.00)),
            movement(MovementKind::Ingreso, dec!(25.00)),
        ];

        let result = recompute_pair(dec!(100.00), &movements);
        assert_eq!(result.recomputed, dec!(125.00));
    }

    #[test]
    fn empty_history_recomputes_to_initial() {
        let result = recompute_pair(dec!(42.17), &[]);
        assert_eq!(result.recomputed, dec!(42.17));
        assert_eq!(result.total_ingresos, Decimal::ZERO);
    }

    #[test]
    fn negative_ajustes_reduce_the_recomputed_balance() {
        let movements = vec![
            movement(MovementKind::Ajuste, dec!(-70.00)),
            movement(MovementKind::Ajuste, dec!(5.50)),
        ];

        let result = recompute_pair(dec!(200.00), &movements);
        assert_eq!(result.total_ajustes, dec!(-64.50));
        assert_eq!(result.recomputed, dec!(135.50));
    }
}
