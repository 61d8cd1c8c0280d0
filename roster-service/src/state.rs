//! Application state for roster service.

use std::sync::Arc;
use std::time::Duration;

use common::config::AppConfig;

use crate::service::RosterService;
use crate::settings_store::{InMemorySettingsStore, SettingsStore};
use crate::source_client::{SqlUserSource, UserSource};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn SettingsStore>,
    pub source: Arc<dyn UserSource>,
}

impl AppState {
    /// Creates state with an empty in-memory store and the sqlx client.
    pub fn new(config: AppConfig) -> Self {
        let source = SqlUserSource::new(
            config.schema_profile,
            Duration::from_secs(config.query_timeout_secs),
        );
        Self::with_parts(config, Arc::new(InMemorySettingsStore::new()), Arc::new(source))
    }

    /// Creates state from explicit collaborators.
    pub fn with_parts(
        config: AppConfig,
        store: Arc<dyn SettingsStore>,
        source: Arc<dyn UserSource>,
    ) -> Self {
        Self {
            config,
            store,
            source,
        }
    }

    /// Service bound to this state's store and client.
    pub fn roster(&self) -> RosterService {
        RosterService::new(self.store.clone(), self.source.clone())
    }
}
