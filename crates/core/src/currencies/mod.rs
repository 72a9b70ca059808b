pub(crate) mod currencies_errors;
pub(crate) mod currencies_model;
pub(crate) mod currencies_repository;
pub(crate) mod currencies_service;

pub use currencies_errors::CurrencyError;
pub use currencies_model::{Currency, CurrencyDB, CurrencyUpdate, NewCurrency};
pub use currencies_repository::CurrencyRepository;
pub use currencies_service::CurrencyService;

pub type Result<T> = std::result::Result<T, CurrencyError>;
