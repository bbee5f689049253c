use crate::core::inflight::InFlightGuard;
use crate::core::session::CaptureSession;
use crate::domain::model::{ImagePayload, PoseResult};
use crate::domain::ports::MlService;
use crate::utils::error::{Result, SmartFitError};

/// Sends a captured image to the pose service and hands the result to the session.
pub struct PoseCaptureFlow<M: MlService> {
    ml: M,
    guard: InFlightGuard,
}

impl<M: MlService> PoseCaptureFlow<M> {
    pub fn new(ml: M) -> Self {
        Self {
            ml,
            guard: InFlightGuard::new("Pose estimation"),
        }
    }

    /// On failure the session is left untouched.
    pub async fn estimate(
        &self,
        image: ImagePayload,
        session: &mut CaptureSession,
    ) -> Result<PoseResult> {
        if image.is_empty() {
            return Err(SmartFitError::precondition(
                "Please capture or upload a photo first.",
                vec!["image".to_string()],
            ));
        }

        let _ticket = self.guard.try_begin()?;
        let result = self.ml.estimate_pose(&image).await?;

        session.record_pose(result.clone(), image);
        Ok(result)
    }
}
