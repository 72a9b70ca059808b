pub(crate) mod ledger_errors;
pub(crate) mod ledger_model;
pub(crate) mod ledger_repository;
pub(crate) mod ledger_service;
pub(crate) mod normalizer;
pub(crate) mod posting;

pub use ledger_errors::LedgerError;
pub use ledger_model::{
    Movement, MovementDB, MovementKind, MovementQuery, NewAdjustment, SettlementChannel,
};
pub use ledger_repository::LedgerRepository;
pub use ledger_service::LedgerService;
pub use normalizer::NormalizationReport;
pub use posting::{post_movement, PostMovementInput};

pub type Result<T> = std::result::Result<T, LedgerError>;
