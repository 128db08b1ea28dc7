use std::sync::Arc;

use threadmark_storage::ObjectStore;

use crate::config::ServerConfig;

/// Handler state: the Postgres pool, config, and the screenshot store.
#[derive(Clone)]
pub struct AppState {
    pub pool: threadmark_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Screenshot blob storage.
    pub store: Arc<dyn ObjectStore>,
}

impl AppState {
    /// First segment of every screenshot storage key.
    pub fn base_folder(&self) -> &str {
        &self.config.storage.base_folder
    }
}
