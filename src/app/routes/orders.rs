use std::sync::Arc;

use axum::{
    routing::{get, put},
    Json, Router,
};

use super::{pending, Acknowledgement};
use crate::app::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/:id", get(get_order))
        .route("/:id/status", put(update_order_status))
}

async fn list_orders() -> Json<Acknowledgement> {
    pending("Get all orders")
}

async fn get_order() -> Json<Acknowledgement> {
    pending("Get order by ID")
}

async fn create_order() -> Json<Acknowledgement> {
    pending("Create order")
}

async fn update_order_status() -> Json<Acknowledgement> {
    pending("Update order status")
}
