//! Data source settings store.
//!
//! Holds the named data source configurations edited on the settings page.
//! Built once at startup and shared through [`crate::state::AppState`].

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;

use common::models::{DataSourceConfig, NamedDataSource};

/// Name-keyed registry of data sources.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Looks up one source by name.
    async fn get(&self, name: &str) -> Option<DataSourceConfig>;

    /// Inserts or overwrites a source. Last writer wins.
    async fn set(&self, name: &str, config: DataSourceConfig);

    /// All sources in iteration order.
    async fn list(&self) -> Vec<NamedDataSource>;
}

/// Process-local store; contents are lost on restart.
///
/// Iteration follows first insertion. Overwriting a name keeps its slot.
#[derive(Default)]
pub struct InMemorySettingsStore {
    sources: RwLock<IndexMap<String, DataSourceConfig>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn get(&self, name: &str) -> Option<DataSourceConfig> {
        self.sources.read().await.get(name).cloned()
    }

    async fn set(&self, name: &str, config: DataSourceConfig) {
        let replaced = self
            .sources
            .write()
            .await
            .insert(name.to_string(), config)
            .is_some();
        tracing::debug!(source = %name, replaced, "数据源配置已写入");
    }

    async fn list(&self) -> Vec<NamedDataSource> {
        self.sources
            .read()
            .await
            .iter()
            .map(|(name, config)| NamedDataSource {
                name: name.clone(),
                config: config.clone(),
            })
            .collect()
    }
}
