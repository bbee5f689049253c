use std::sync::Arc;

use axum::{routing::post, Json, Router};

use super::{pending, Acknowledgement};
use crate::app::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
}

async fn register() -> Json<Acknowledgement> {
    pending("Register endpoint")
}

async fn login() -> Json<Acknowledgement> {
    pending("Login endpoint")
}

async fn refresh() -> Json<Acknowledgement> {
    pending("Refresh token endpoint")
}

async fn logout() -> Json<Acknowledgement> {
    pending("Logout endpoint")
}
