pub(crate) mod balances_errors;
pub(crate) mod balances_model;
pub(crate) mod balances_repository;
pub(crate) mod balances_service;
pub(crate) mod initial_balances_repository;

pub use balances_errors::BalanceError;
pub use balances_model::{
    Balance, BalanceDB, CashPosition, InitialBalance, InitialBalanceDB, NewInitialBalance,
};
pub use balances_repository::BalanceRepository;
pub use balances_service::BalanceService;
pub use initial_balances_repository::InitialBalanceRepository;

pub type Result<T> = std::result::Result<T, BalanceError>;
