use crate::core::camera::CameraCapture;
use crate::domain::model::ImagePayload;
use crate::domain::ports::CameraDevice;
use crate::utils::error::{Result, SmartFitError};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where a photo comes from: a file on disk or one still from a camera.
#[derive(Debug, Clone)]
pub enum PhotoSource {
    File(PathBuf),
    Camera { frame_timeout: Duration },
}

impl PhotoSource {
    pub async fn acquire(&self, camera: Option<&dyn CameraDevice>) -> Result<ImagePayload> {
        match self {
            Self::File(path) => read_image_file(path).await,
            Self::Camera { frame_timeout } => {
                let device = camera.ok_or_else(|| SmartFitError::Camera {
                    message: "no camera configured".to_string(),
                })?;
                let capture = CameraCapture::open(device, *frame_timeout).await?;
                capture.capture_still().await
            }
        }
    }
}

pub async fn read_image_file(path: &Path) -> Result<ImagePayload> {
    let bytes = tokio::fs::read(path).await?;
    ImagePayload::from_bytes(bytes).map_err(|e| SmartFitError::Image {
        message: format!("{}: {}", path.display(), e),
    })
}
