/// Movement kinds
///
/// Each constant is one of the ledger's movement categories. The Spanish
/// names are the domain vocabulary used at the counters and are stored
/// verbatim in the `movements.kind` column.
/// Credit: money entering the location's balance. Signed amount > 0.
pub const MOVEMENT_KIND_INGRESO: &str = "INGRESO";

/// Debit: money leaving the location's balance. Signed amount < 0.
pub const MOVEMENT_KIND_EGRESO: &str = "EGRESO";

/// Manual or corrective movement. Either sign, taken at face value.
pub const MOVEMENT_KIND_AJUSTE: &str = "AJUSTE";

/// Informational marker written when an initial balance is assigned.
/// Excluded from recomputation (the amount lives in `initial_balances`).
pub const MOVEMENT_KIND_SALDO_INICIAL: &str = "SALDO_INICIAL";

/// Settlement channels (structural, never inferred from description text)
pub const CHANNEL_CASH: &str = "CASH";
pub const CHANNEL_BANK: &str = "BANK";
pub const CHANNEL_MIXED: &str = "MIXED";

/// Source kinds stamped on movements by the orchestrator
pub const SOURCE_KIND_EXCHANGE: &str = "EXCHANGE";
pub const SOURCE_KIND_TRANSFER: &str = "TRANSFER";
pub const SOURCE_KIND_EXTERNAL_SERVICE: &str = "EXTERNAL_SERVICE";
pub const SOURCE_KIND_MANUAL_ADJUSTMENT: &str = "MANUAL_ADJUSTMENT";
pub const SOURCE_KIND_RECONCILIATION: &str = "RECONCILIATION";
pub const SOURCE_KIND_INITIAL_BALANCE: &str = "INITIAL_BALANCE";

/// Transfer statuses
pub const TRANSFER_STATUS_PENDIENTE: &str = "PENDIENTE";
pub const TRANSFER_STATUS_EN_TRANSITO: &str = "EN_TRANSITO";
pub const TRANSFER_STATUS_APROBADO: &str = "APROBADO";
pub const TRANSFER_STATUS_CANCELADO: &str = "CANCELADO";

/// Exchange statuses
pub const EXCHANGE_STATUS_PENDIENTE: &str = "PENDIENTE";
pub const EXCHANGE_STATUS_COMPLETADO: &str = "COMPLETADO";
