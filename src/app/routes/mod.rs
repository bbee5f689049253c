use axum::Json;
use serde::{Deserialize, Serialize};

pub mod auth;
pub mod health;
pub mod orders;
pub mod products;
pub mod try_on;
pub mod users;

/// Fixed reply of an endpoint that accepts any input and does no work yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub message: String,
}

pub(crate) fn pending(operation: &str) -> Json<Acknowledgement> {
    tracing::debug!("Stub endpoint called: {operation}");
    Json(Acknowledgement {
        message: format!("{operation} - to be implemented"),
    })
}
