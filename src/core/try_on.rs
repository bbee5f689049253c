use crate::core::camera::CameraSlot;
use crate::core::inflight::InFlightGuard;
use crate::core::session::CaptureSession;
use crate::domain::model::{
    ImagePayload, Measurements, MlOperation, Product, TryOnRequest, TryOnResult,
};
use crate::domain::ports::{CameraDevice, CatalogSource, MlService};
use crate::utils::error::{Result, SmartFitError};
use std::time::Duration;

pub const TRY_ON_REQUIRED: &str =
    "Please upload images and ensure pose/measurements are available.";
pub const CATALOG_TRY_ON_REQUIRED: &str = "Please choose a product and take or upload a photo.";

/// Form-driven try-on: user photo and garment photo, plus the pose and
/// measurements already recorded in the session.
pub struct FormTryOn<M: MlService> {
    ml: M,
    guard: InFlightGuard,
}

impl<M: MlService> FormTryOn<M> {
    pub fn new(ml: M) -> Self {
        Self {
            ml,
            guard: InFlightGuard::new("Virtual try-on"),
        }
    }

    pub async fn run(
        &self,
        user_image: Option<&ImagePayload>,
        garment_image: Option<&ImagePayload>,
        session: &CaptureSession,
    ) -> Result<TryOnResult> {
        let mut missing = Vec::new();
        if user_image.is_none() {
            missing.push("user image".to_string());
        }
        if garment_image.is_none() {
            missing.push("garment image".to_string());
        }
        if session.pose().is_none() {
            missing.push("pose result".to_string());
        }
        if session.measurements().is_none() {
            missing.push("measurements".to_string());
        }

        let (Some(user), Some(garment), Some(pose), Some(measurements)) = (
            user_image,
            garment_image,
            session.pose(),
            session.measurements(),
        ) else {
            return Err(SmartFitError::precondition(TRY_ON_REQUIRED, missing));
        };

        let _ticket = self.guard.try_begin()?;
        let request = TryOnRequest::new(
            user,
            garment,
            pose.result.pose_data.clone(),
            measurements.clone(),
        );
        self.ml.virtual_try_on(&request).await
    }

    pub fn is_running(&self) -> bool {
        self.guard.is_busy()
    }
}

/// State of the catalog "try on" dialog: chosen product, the photo, the
/// camera while it is open, and the last result.
#[derive(Default)]
pub struct TryOnDialog {
    product: Option<Product>,
    photo: Option<ImagePayload>,
    result: Option<TryOnResult>,
    camera: CameraSlot,
}

impl TryOnDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Choosing a product starts over: photo, result and camera are reset.
    pub fn select(&mut self, product: Product) {
        self.camera.close();
        self.product = Some(product);
        self.photo = None;
        self.result = None;
    }

    pub async fn open_camera(
        &mut self,
        device: &dyn CameraDevice,
        frame_timeout: Duration,
    ) -> Result<()> {
        self.camera.open(device, frame_timeout).await
    }

    pub async fn capture_photo(&mut self) -> Result<&ImagePayload> {
        let photo = self.camera.capture().await?;
        self.result = None;
        Ok(self.photo.insert(photo))
    }

    pub fn use_photo(&mut self, photo: ImagePayload) {
        self.camera.close();
        self.result = None;
        self.photo = Some(photo);
    }

    pub fn product(&self) -> Option<&Product> {
        self.product.as_ref()
    }

    pub fn photo(&self) -> Option<&ImagePayload> {
        self.photo.as_ref()
    }

    pub fn result(&self) -> Option<&TryOnResult> {
        self.result.as_ref()
    }

    pub fn camera_tracks(&self) -> usize {
        self.camera.active_tracks()
    }

    pub fn close(&mut self) {
        self.camera.close();
        self.product = None;
        self.photo = None;
        self.result = None;
    }
}

/// Catalog-driven try-on: a catalog product's image on the user's photo.
/// Pose and measurements are sent as empty placeholders.
pub struct CatalogTryOn<M: MlService, C: CatalogSource> {
    ml: M,
    catalog: C,
    guard: InFlightGuard,
}

impl<M: MlService, C: CatalogSource> CatalogTryOn<M, C> {
    pub fn new(ml: M, catalog: C) -> Self {
        Self {
            ml,
            catalog,
            guard: InFlightGuard::new("Catalog try-on"),
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub async fn submit(&self, dialog: &mut TryOnDialog) -> Result<TryOnResult> {
        let (Some(product), Some(photo)) = (dialog.product(), dialog.photo()) else {
            let mut missing = Vec::new();
            if dialog.product().is_none() {
                missing.push("product".to_string());
            }
            if dialog.photo().is_none() {
                missing.push("photo".to_string());
            }
            return Err(SmartFitError::precondition(CATALOG_TRY_ON_REQUIRED, missing));
        };

        let _ticket = self.guard.try_begin()?;
        tracing::info!("Trying on '{}'", product.name);

        let garment = self
            .catalog
            .fetch_image(&product.image)
            .await
            .map_err(|e| {
                tracing::warn!("Garment image for '{}' unavailable: {}", product.name, e);
                SmartFitError::UpstreamFailed {
                    operation: MlOperation::VirtualTryOn,
                    reason: format!("garment image unavailable: {}", e),
                }
            })?;
        let request = TryOnRequest::new(
            photo,
            &garment,
            serde_json::Value::Object(serde_json::Map::new()),
            Measurements::default(),
        );
        let result = self.ml.virtual_try_on(&request).await?;

        dialog.result = Some(result.clone());
        Ok(result)
    }
}
