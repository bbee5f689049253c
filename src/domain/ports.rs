use crate::domain::model::{
    ImagePayload, Measurements, PoseResult, Product, TryOnRequest, TryOnResult,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn remove_file(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn ml_service_url(&self) -> &str;
    fn backend_url(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn session_directory(&self) -> &str;
}

/// The external ML inference service.
#[async_trait]
pub trait MlService: Send + Sync {
    async fn estimate_pose(&self, image: &ImagePayload) -> Result<PoseResult>;
    async fn measure_body(
        &self,
        image: &ImagePayload,
        pose_data: &serde_json::Value,
    ) -> Result<Measurements>;
    async fn virtual_try_on(&self, request: &TryOnRequest) -> Result<TryOnResult>;
    async fn health(&self) -> Result<serde_json::Value>;
}

/// Read access to the product catalog and to garment images it references.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>>;
    async fn get_product(&self, id: u32) -> Result<Product>;
    async fn fetch_image(&self, url: &str) -> Result<ImagePayload>;
}

/// A camera that can be opened into a live video stream.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    async fn open(&self) -> Result<Box<dyn VideoStream>>;
}

/// A live stream holding one or more media tracks until stopped.
#[async_trait]
pub trait VideoStream: Send {
    async fn read_frame(&mut self) -> Result<ImagePayload>;
    fn stop_all_tracks(&mut self);
    fn active_tracks(&self) -> usize;
}
