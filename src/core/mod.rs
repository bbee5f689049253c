pub mod camera;
pub mod catalog;
pub mod inflight;
pub mod measurement;
pub mod photo;
pub mod pose_capture;
pub mod session;
pub mod try_on;

pub use crate::domain::model::{
    Cart, ImageFormat, ImagePayload, MeasurementForm, Measurements, PoseResult, Product,
    TryOnResult,
};
pub use crate::domain::ports::{CameraDevice, CatalogSource, ConfigProvider, MlService, Storage};
pub use crate::utils::error::Result;
