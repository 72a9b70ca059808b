pub(crate) mod reconciliation_errors;
pub(crate) mod reconciliation_model;
pub(crate) mod reconciliation_service;
pub(crate) mod recompute;

pub use reconciliation_errors::ReconciliationError;
pub use reconciliation_model::{PairReport, ReconciliationSummary};
pub use reconciliation_service::ReconciliationService;
pub use recompute::{recompute_pair, Recomputed};

pub type Result<T> = std::result::Result<T, ReconciliationError>;
