use crate::core::inflight::InFlightGuard;
use crate::core::session::CaptureSession;
use crate::domain::model::{MeasurementForm, Measurements};
use crate::domain::ports::MlService;
use crate::utils::error::{Result, SmartFitError};

pub const POSE_REQUIRED: &str = "Please estimate pose first on the Pose Estimation page.";

pub struct MeasurementFlow<M: MlService> {
    ml: M,
    guard: InFlightGuard,
}

impl<M: MlService> MeasurementFlow<M> {
    pub fn new(ml: M) -> Self {
        Self {
            ml,
            guard: InFlightGuard::new("Body measurement"),
        }
    }

    /// Replaces the form fields with measurements derived from the stored pose.
    /// Fails before any outbound call when no pose has been captured.
    pub async fn fetch(&self, session: &CaptureSession, form: &mut MeasurementForm) -> Result<()> {
        let captured = match session.pose() {
            Some(captured) if !captured.image.is_empty() => captured,
            Some(_) => {
                return Err(SmartFitError::precondition(
                    POSE_REQUIRED,
                    vec!["pose image".to_string()],
                ))
            }
            None => {
                return Err(SmartFitError::precondition(
                    POSE_REQUIRED,
                    vec!["pose result".to_string(), "pose image".to_string()],
                ))
            }
        };

        let _ticket = self.guard.try_begin()?;
        let measurements = self
            .ml
            .measure_body(&captured.image, &captured.result.pose_data)
            .await?;

        tracing::info!("Fetched {} measurements from ML", measurements.0.len());
        form.replace_with(&measurements);
        Ok(())
    }

    /// Stores the filled form fields in the session for the try-on step.
    pub fn save(&self, form: &MeasurementForm, session: &mut CaptureSession) -> Result<Measurements> {
        let measurements = form.to_measurements();
        if measurements.is_empty() {
            return Err(SmartFitError::ValidationError {
                message: "no measurements to save".to_string(),
            });
        }

        session.save_measurements(measurements.clone())?;
        Ok(measurements)
    }
}
