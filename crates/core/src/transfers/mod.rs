pub(crate) mod transfers_errors;
pub(crate) mod transfers_model;
pub(crate) mod transfers_repository;
pub(crate) mod transfers_service;

pub use transfers_errors::TransferError;
pub use transfers_model::{NewTransfer, Transfer, TransferChannel, TransferDB, TransferStatus};
pub use transfers_repository::TransferRepository;
pub use transfers_service::TransferService;

pub type Result<T> = std::result::Result<T, TransferError>;
