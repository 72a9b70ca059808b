pub(crate) mod exchanges_errors;
pub(crate) mod exchanges_model;
pub(crate) mod exchanges_repository;
pub(crate) mod exchanges_service;

pub use exchanges_errors::ExchangeError;
pub use exchanges_model::{Exchange, ExchangeDB, ExchangeStatus, NewExchange};
pub use exchanges_repository::ExchangeRepository;
pub use exchanges_service::ExchangeService;

pub type Result<T> = std::result::Result<T, ExchangeError>;
