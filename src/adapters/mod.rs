// Adapters layer: concrete implementations for external systems (ML service, backend, cache, camera).

pub mod backend_client;
pub mod cache;
pub mod camera;
pub mod ml_client;

pub use backend_client::HttpCatalogClient;
pub use cache::{CacheConnector, CacheState};
pub use camera::ProcessCamera;
pub use ml_client::HttpMlClient;
