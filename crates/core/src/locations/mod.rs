pub(crate) mod locations_errors;
pub(crate) mod locations_model;
pub(crate) mod locations_repository;
pub(crate) mod locations_service;

pub use locations_errors::LocationError;
pub use locations_model::{Location, LocationDB, LocationUpdate, NewLocation};
pub use locations_repository::LocationRepository;
pub use locations_service::LocationService;

pub type Result<T> = std::result::Result<T, LocationError>;
