use std::sync::Arc;

use axum::{routing::get, Json, Router};

use super::{pending, Acknowledgement};
use crate::app::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/measurements", get(get_measurements).put(update_measurements))
}

async fn get_profile() -> Json<Acknowledgement> {
    pending("Get user profile")
}

async fn update_profile() -> Json<Acknowledgement> {
    pending("Update user profile")
}

async fn get_measurements() -> Json<Acknowledgement> {
    pending("Get user measurements")
}

async fn update_measurements() -> Json<Acknowledgement> {
    pending("Update user measurements")
}
