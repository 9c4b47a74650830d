mod config_service;
mod error;
mod validation;


pub use config_service::ConfigService;
pub use error::{ServiceError, ServiceResult};
pub use validation::{SchemaValidator, ValidationError, config_data_schema};
