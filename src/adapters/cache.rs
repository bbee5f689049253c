use crate::config::{AppConfig, RuntimeEnvironment};
use crate::utils::error::{Result, SmartFitError};
use redis::aio::ConnectionManager;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheState {
    /// No connection attempted; every operation is a no-op.
    Unconfigured,
    Connected,
    /// Was connected, then lost the connection or was shut down.
    Disconnected,
}

struct CacheInner {
    state: CacheState,
    connection: Option<ConnectionManager>,
}

/// Best-effort, process-wide cache connection. Nothing is required to use
/// it; callers check [`CacheConnector::is_available`] first.
pub struct CacheConnector {
    inner: RwLock<CacheInner>,
}

impl CacheConnector {
    pub fn unconfigured() -> Self {
        Self {
            inner: RwLock::new(CacheInner {
                state: CacheState::Unconfigured,
                connection: None,
            }),
        }
    }

    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        Self::connect(
            config.cache.url.as_deref(),
            config.server.environment,
            config.cache_connect_timeout(),
        )
        .await
    }

    /// Connection failure is fatal only in production; elsewhere the
    /// connector falls back to the unconfigured behaviour.
    pub async fn connect(
        url: Option<&str>,
        environment: RuntimeEnvironment,
        timeout: Duration,
    ) -> Result<Self> {
        let Some(url) = url else {
            tracing::info!("Cache not configured, continuing without cache");
            return Ok(Self::unconfigured());
        };

        match tokio::time::timeout(timeout, open_connection(url)).await {
            Ok(Ok(connection)) => {
                tracing::info!("Cache connected");
                Ok(Self {
                    inner: RwLock::new(CacheInner {
                        state: CacheState::Connected,
                        connection: Some(connection),
                    }),
                })
            }
            outcome => {
                let reason = match outcome {
                    Ok(Err(e)) => e.to_string(),
                    _ => format!("timed out after {:?}", timeout),
                };

                if environment.is_production() {
                    tracing::error!("Cache connection failed in production: {}", reason);
                    return Err(SmartFitError::FatalStartup {
                        message: format!("cache connection failed: {}", reason),
                    });
                }

                tracing::warn!("Cache not available ({}), continuing without cache", reason);
                Ok(Self::unconfigured())
            }
        }
    }

    pub async fn state(&self) -> CacheState {
        self.inner.read().await.state
    }

    pub async fn is_available(&self) -> bool {
        self.state().await == CacheState::Connected
    }

    /// Handle for future consumers; `None` unless connected.
    pub async fn connection(&self) -> Option<ConnectionManager> {
        let inner = self.inner.read().await;
        match inner.state {
            CacheState::Connected => inner.connection.clone(),
            _ => None,
        }
    }

    /// Pings a connected cache; a failed ping moves it to `Disconnected`.
    pub async fn health_check(&self) -> CacheState {
        let Some(mut connection) = self.connection().await else {
            return self.state().await;
        };

        let ping: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut connection).await;
        if let Err(e) = ping {
            tracing::warn!("Cache ping failed: {}", e);
            let mut inner = self.inner.write().await;
            inner.state = CacheState::Disconnected;
            inner.connection = None;
        }

        self.state().await
    }

    pub async fn disconnect(&self) {
        let mut inner = self.inner.write().await;
        if inner.state == CacheState::Unconfigured {
            return;
        }
        inner.connection = None;
        inner.state = CacheState::Disconnected;
        tracing::info!("Cache disconnected");
    }
}

async fn open_connection(url: &str) -> Result<ConnectionManager> {
    let client = redis::Client::open(url)?;
    let mut connection = client.get_connection_manager().await?;
    let _pong: String = redis::cmd("PING").query_async(&mut connection).await?;
    Ok(connection)
}
