use std::sync::Arc;

use crate::adapters::cache::CacheConnector;
use crate::config::AppConfig;
use crate::core::catalog::ProductCatalog;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct AppState {
    pub config: AppConfig,
    pub catalog: ProductCatalog,
    pub cache: CacheConnector,
    pub monitor: SystemMonitor,
}

impl AppState {
    /// Connects the cache as configured; fails only where a cache failure is fatal.
    pub async fn new(config: AppConfig) -> Result<Arc<Self>> {
        let cache = CacheConnector::from_config(&config).await?;
        Ok(Self::with_cache(config, cache))
    }

    pub fn with_cache(config: AppConfig, cache: CacheConnector) -> Arc<Self> {
        Arc::new(Self {
            config,
            catalog: ProductCatalog::seeded(),
            cache,
            monitor: SystemMonitor::new(),
        })
    }
}
