use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use super::{pending, Acknowledgement};
use crate::app::error::ApiError;
use crate::app::state::AppState;
use crate::domain::model::Product;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/upload-image", post(upload_image))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

async fn list_products(State(state): State<Arc<AppState>>) -> Json<Vec<Product>> {
    Json(state.catalog.list().to_vec())
}

async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product = state.catalog.get_by_path_id(&id)?;
    Ok(Json(product.clone()))
}

async fn create_product() -> Json<Acknowledgement> {
    pending("Create product")
}

async fn update_product() -> Json<Acknowledgement> {
    pending("Update product")
}

async fn delete_product() -> Json<Acknowledgement> {
    pending("Delete product")
}

async fn upload_image() -> Json<Acknowledgement> {
    pending("Upload product image")
}
