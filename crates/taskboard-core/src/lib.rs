pub mod config;
pub mod error;
pub mod id;
pub mod result;

pub use config::{AppConfig, RetryConfig, StorageBackend};
pub use error::TaskboardError;
pub use id::ObjectId;
pub use result::TaskboardResult;
