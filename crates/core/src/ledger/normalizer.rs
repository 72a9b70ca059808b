use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::{info, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ledger_model::parse_stored_decimal;
use super::Result;
use crate::constants::{MOVEMENT_KIND_EGRESO, MOVEMENT_KIND_INGRESO};
use crate::schema::movements::dsl::*;

/// Outcome of a sign-normalization pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizationReport {
    pub scanned: usize,
    pub misfiled_egresos: usize,
    pub misfiled_ingresos: usize,
    pub applied: bool,
}

impl NormalizationReport {
    pub fn total_misfiled(&self) -> usize {
        self.misfiled_egresos + self.misfiled_ingresos
    }
}

/// Repairs the sign convention of historical entries: an EGRESO stored
/// non-negative or an INGRESO stored negative gets its sign flipped. Kind
/// and magnitude are never touched, and the pass is idempotent. Must run
/// before reconciliation for drift figures to mean anything.
///
/// With `apply == false` the pass only counts what it would change.
pub fn normalize_signs(
    conn: &mut SqliteConnection,
    location_filter: Option<&str>,
    from: Option<NaiveDateTime>,
    to: Option<NaiveDateTime>,
    apply: bool,
) -> Result<NormalizationReport> {
    let mut query = movements
        .filter(kind.eq_any([MOVEMENT_KIND_INGRESO, MOVEMENT_KIND_EGRESO]))
        .into_boxed();
    if let Some(loc) = location_filter {
        query = query.filter(location_id.eq(loc.to_string()));
    }
    if let Some(from_ts) = from {
        query = query.filter(created_at.ge(from_ts));
    }
    if let Some(to_ts) = to {
        query = query.filter(created_at.le(to_ts));
    }

    let rows = query
        .select((id, kind, amount))
        .load::<(String, String, String)>(conn)?;

    let mut report = NormalizationReport {
        scanned: rows.len(),
        applied: apply,
        ..Default::default()
    };

    for (movement_id, movement_kind, raw_amount) in rows {
        let signed_amount = match parse_stored_decimal(&raw_amount) {
            Ok(value) => value,
            Err(e) => {
                warn!("Skipping movement {} during normalization: {}", movement_id, e);
                continue;
            }
        };

        let misfiled = match movement_kind.as_str() {
            MOVEMENT_KIND_EGRESO => signed_amount > Decimal::ZERO,
            MOVEMENT_KIND_INGRESO => signed_amount < Decimal::ZERO,
            _ => false,
        };
        if !misfiled {
            continue;
        }

        if movement_kind == MOVEMENT_KIND_EGRESO {
            report.misfiled_egresos += 1;
        } else {
            report.misfiled_ingresos += 1;
        }

        if apply {
            diesel::update(movements.find(&movement_id))
                .set(amount.eq((-signed_amount).to_string()))
                .execute(conn)?;
        }
    }

    if report.total_misfiled() > 0 {
        info!(
            "Sign normalization: {} misfiled of {} scanned (egresos {}, ingresos {}), applied: {}",
            report.total_misfiled(),
            report.scanned,
            report.misfiled_egresos,
            report.misfiled_ingresos,
            apply
        );
    }

    Ok(report)
}
