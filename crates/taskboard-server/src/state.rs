use std::sync::Arc;
use taskboard_core::{AppConfig, StorageBackend, TaskboardResult};
use taskboard_domain::BoardOperations;
use taskboard_persistence::{DocumentStore, MemoryStore, RetryPolicy};

use crate::context::BoardContext;

#[derive(Clone)]
pub struct AppState {
    pub operations: Arc<dyn BoardOperations>,
}

impl AppState {
    pub fn new(operations: Arc<dyn BoardOperations>) -> Self {
        Self { operations }
    }

    pub fn with_store(store: Arc<dyn DocumentStore>, retry: RetryPolicy) -> Self {
        Self::new(Arc::new(BoardContext::new(store, retry)))
    }

    /// Build the configured storage backend and wrap it.
    pub async fn from_config(config: &AppConfig) -> TaskboardResult<Self> {
        let store = open_store(config).await?;
        tracing::info!("Using {} storage", store.backend_name());
        Ok(Self::with_store(store, RetryPolicy::from_config(&config.retry)))
    }
}

async fn open_store(config: &AppConfig) -> TaskboardResult<Arc<dyn DocumentStore>> {
    match config.storage {
        StorageBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        #[cfg(feature = "sqlite")]
        StorageBackend::Sqlite => {
            let store = taskboard_persistence::SqliteStore::connect(&config.database_path).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "sqlite"))]
        StorageBackend::Sqlite => Err(taskboard_core::TaskboardError::Config(
            "the sqlite backend requires building with the \"sqlite\" feature".to_string(),
        )),
    }
}
