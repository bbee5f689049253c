use anyhow::Result;
use smartfit::utils::error::ErrorSeverity;
use smartfit::{AppConfig, AppState, CacheState, RuntimeEnvironment, SmartFitError};

fn config_with_unreachable_cache(environment: RuntimeEnvironment) -> AppConfig {
    let mut config = AppConfig::default();
    config.server.environment = environment;
    config.cache.url = Some("redis://127.0.0.1:1".to_string());
    config.cache.connect_timeout_ms = 500;
    config
}

#[tokio::test]
async fn test_unreachable_cache_is_tolerated_in_development() -> Result<()> {
    let config = config_with_unreachable_cache(RuntimeEnvironment::Development);
    let state = AppState::new(config).await?;

    assert_eq!(state.cache.state().await, CacheState::Unconfigured);
    assert!(!state.cache.is_available().await);
    assert!(state.catalog.get(1).is_ok());
    Ok(())
}

#[tokio::test]
async fn test_unreachable_cache_is_fatal_in_production() {
    let config = config_with_unreachable_cache(RuntimeEnvironment::Production);

    let err = match AppState::new(config).await {
        Ok(_) => panic!("production startup should fail without its cache"),
        Err(e) => e,
    };
    assert!(matches!(err, SmartFitError::FatalStartup { .. }));
    assert_eq!(err.severity(), ErrorSeverity::Critical);
}

#[tokio::test]
async fn test_production_without_cache_url_starts() -> Result<()> {
    let mut config = AppConfig::default();
    config.server.environment = RuntimeEnvironment::Production;

    let state = AppState::new(config).await?;
    assert_eq!(state.cache.health_check().await, CacheState::Unconfigured);
    Ok(())
}
