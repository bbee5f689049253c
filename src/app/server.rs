use std::{sync::Arc, time::Duration};

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::get,
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use super::routes::{auth, health, orders, products, try_on, users};
use super::state::AppState;
use crate::config::AppConfig;
use crate::utils::error::Result;

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        .route("/", get(health::service_info))
        .route("/health", get(health::health))
        .nest("/api/auth", auth::router())
        .nest("/api/users", users::router())
        .nest("/api/orders", orders::router())
        .nest("/api/products", products::router())
        .nest("/api/try-on", try_on::router())
        .nest("/products", products::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `"*"` anywhere in the list allows every origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|origin| origin.trim() == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(listed_origins(origins))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60))
}

fn listed_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {origin}");
                None
            }
        })
        .collect()
}

/// Connects the cache, serves until Ctrl+C or SIGTERM, then disconnects.
pub async fn start_server(config: AppConfig) -> Result<()> {
    info!("Initializing state...");
    let state = AppState::new(config).await?;
    state.monitor.log_stats("Startup");

    let address = state.config.bind_address();
    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;

    serve(listener, state).await
}

pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<()> {
    let address = listener.local_addr()?;
    info!(
        "Server running on {address} ({})",
        state.config.server.environment
    );

    axum::serve(listener, build_router(Arc::clone(&state)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");
    state.cache.disconnect().await;
    state.monitor.log_stats("Shutdown");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::CacheConnector;

    #[test]
    fn test_wildcard_origin_builds_router() {
        let mut config = AppConfig::default();
        config.server.cors_origins = vec!["*".to_string()];
        let state = AppState::with_cache(config, CacheConnector::unconfigured());

        let _router = build_router(state);
    }

    #[test]
    fn test_listed_origins_skip_invalid_values() {
        let origins = vec![
            "http://localhost:3000".to_string(),
            "bad\norigin".to_string(),
        ];
        assert_eq!(
            listed_origins(&origins),
            vec![HeaderValue::from_static("http://localhost:3000")]
        );
    }
}
