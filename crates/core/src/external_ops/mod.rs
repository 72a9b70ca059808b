pub(crate) mod external_ops_errors;
pub(crate) mod external_ops_model;
pub(crate) mod external_ops_repository;
pub(crate) mod external_ops_service;

pub use external_ops_errors::ExternalOperationError;
pub use external_ops_model::{ExternalOperation, ExternalOperationDB, NewExternalOperation};
pub use external_ops_repository::ExternalOperationRepository;
pub use external_ops_service::ExternalOperationService;

pub type Result<T> = std::result::Result<T, ExternalOperationError>;
