//! HTTP API: product catalog, placeholder auth/user/order/try-on routes and
//! health reporting, served with axum.

pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{build_router, serve, start_server};
pub use state::AppState;
