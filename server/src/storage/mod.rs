mod backend;
mod config;
mod error;
mod models;
mod queries;
mod schema;
mod traits;


pub use backend::SqliteBackend;
pub use config::{DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_DB_PATH, StorageConfig};
pub use error::StorageError;
pub use models::{Configuration, Version};
pub use traits::{ConfigStorage, StorageResult};
