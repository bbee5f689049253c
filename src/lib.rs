pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{CacheConnector, CacheState, HttpCatalogClient, HttpMlClient, ProcessCamera};
pub use app::{build_router, AppState};
pub use config::{AppConfig, LocalStorage, RuntimeEnvironment};
pub use crate::core::session::{CaptureSession, SessionStore};
pub use utils::error::{Result, SmartFitError};
