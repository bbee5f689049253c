use crate::domain::model::{ImagePayload, Measurements, PoseResult};
use crate::domain::ports::Storage;
use crate::utils::error::{Result, SmartFitError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A pose estimate together with the image it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedPose {
    pub result: PoseResult,
    pub image: ImagePayload,
    pub captured_at: DateTime<Utc>,
}

/// State handed from the capture flow to the measurement and try-on flows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureSession {
    pose: Option<CapturedPose>,
    measurements: Option<Measurements>,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pose(&self) -> Option<&CapturedPose> {
        self.pose.as_ref()
    }

    pub fn measurements(&self) -> Option<&Measurements> {
        self.measurements.as_ref()
    }

    /// A new capture invalidates measurements derived from the previous one.
    pub fn record_pose(&mut self, result: PoseResult, image: ImagePayload) {
        self.pose = Some(CapturedPose {
            result,
            image,
            captured_at: Utc::now(),
        });
        self.measurements = None;
    }

    pub fn save_measurements(&mut self, measurements: Measurements) -> Result<()> {
        measurements.validate()?;
        self.measurements = Some(measurements);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.pose = None;
        self.measurements = None;
    }
}

const SESSION_FILE: &str = "session.json";

/// Persists a [`CaptureSession`] between CLI invocations.
pub struct SessionStore<S: Storage> {
    storage: S,
}

impl<S: Storage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Missing file yields an empty session.
    pub async fn load(&self) -> Result<CaptureSession> {
        match self.storage.read_file(SESSION_FILE).await {
            Ok(data) => Ok(serde_json::from_slice(&data)?),
            Err(SmartFitError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No stored session, starting fresh");
                Ok(CaptureSession::new())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn save(&self, session: &CaptureSession) -> Result<()> {
        let data = serde_json::to_vec_pretty(session)?;
        self.storage.write_file(SESSION_FILE, &data).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.storage.remove_file(SESSION_FILE).await
    }
}
