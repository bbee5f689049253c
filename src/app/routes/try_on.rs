use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};

use super::{pending, Acknowledgement};
use crate::app::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/process", post(process))
        .route("/body-scan", post(body_scan))
        .route("/result/:id", get(get_result))
        .route("/save", post(save))
}

async fn process() -> Json<Acknowledgement> {
    pending("Process try-on")
}

async fn body_scan() -> Json<Acknowledgement> {
    pending("Body scanning")
}

async fn get_result() -> Json<Acknowledgement> {
    pending("Get try-on result")
}

async fn save() -> Json<Acknowledgement> {
    pending("Save try-on result")
}
