use crate::domain::model::{
    ImagePayload, Measurements, MlOperation, PoseResult, TryOnRequest, TryOnResult,
};
use crate::domain::ports::{ConfigProvider, MlService};
use crate::utils::error::{Result, SmartFitError};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Serialize)]
struct PoseEstimationBody<'a> {
    image_data: &'a str,
}

#[derive(Serialize)]
struct BodyMeasurementBody<'a> {
    image_data: &'a str,
    pose_data: &'a serde_json::Value,
}

#[derive(Deserialize)]
struct BodyMeasurementResponse {
    #[serde(default)]
    measurements: Option<Measurements>,
}

#[derive(Deserialize)]
struct VirtualTryOnResponse {
    #[serde(default)]
    result_image: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
}

/// HTTP client for the ML inference service. Every call is a single attempt.
#[derive(Debug, Clone)]
pub struct HttpMlClient {
    base_url: String,
    client: Client,
}

impl HttpMlClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(config.ml_service_url(), config.request_timeout())
    }

    fn endpoint(&self, operation: MlOperation) -> String {
        format!("{}{}", self.base_url, operation.path())
    }

    async fn post_json<B, T>(&self, operation: MlOperation, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(operation);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| {
                tracing::warn!("{} transport failure: {}", operation, source);
                SmartFitError::Upstream { operation, source }
            })?;

        self.decode(operation, response).await
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        operation: MlOperation,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        tracing::debug!("{} responded with {}", operation, status);

        if !status.is_success() {
            tracing::warn!("{} returned HTTP {}", operation, status);
            return Err(SmartFitError::UpstreamStatus {
                operation,
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| SmartFitError::Upstream { operation, source })?;

        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!("{} response could not be decoded: {}", operation, e);
            SmartFitError::InvalidUpstreamResponse {
                operation,
                reason: e.to_string(),
            }
        })
    }
}

#[async_trait]
impl MlService for HttpMlClient {
    async fn estimate_pose(&self, image: &ImagePayload) -> Result<PoseResult> {
        let encoded = image.to_base64();
        let pose: PoseResult = self
            .post_json(
                MlOperation::PoseEstimation,
                &PoseEstimationBody {
                    image_data: &encoded,
                },
            )
            .await?;

        if pose.success == Some(false) {
            return Err(SmartFitError::InvalidUpstreamResponse {
                operation: MlOperation::PoseEstimation,
                reason: "service reported success=false".to_string(),
            });
        }

        tracing::info!("Pose estimated with {} landmarks", pose.landmark_count());
        Ok(pose)
    }

    async fn measure_body(
        &self,
        image: &ImagePayload,
        pose_data: &serde_json::Value,
    ) -> Result<Measurements> {
        let encoded = image.to_base64();
        let response: BodyMeasurementResponse = self
            .post_json(
                MlOperation::BodyMeasurement,
                &BodyMeasurementBody {
                    image_data: &encoded,
                    pose_data,
                },
            )
            .await?;

        response
            .measurements
            .ok_or_else(|| SmartFitError::InvalidUpstreamResponse {
                operation: MlOperation::BodyMeasurement,
                reason: "response has no measurements".to_string(),
            })
    }

    async fn virtual_try_on(&self, request: &TryOnRequest) -> Result<TryOnResult> {
        let response: VirtualTryOnResponse =
            self.post_json(MlOperation::VirtualTryOn, request).await?;

        let encoded = response
            .result_image
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| SmartFitError::InvalidUpstreamResponse {
                operation: MlOperation::VirtualTryOn,
                reason: "response has no result_image".to_string(),
            })?;

        let image = if encoded.starts_with("data:") {
            ImagePayload::from_data_url(&encoded)
        } else {
            ImagePayload::from_base64(&encoded, TryOnResult::FORMAT)
        }
        .map_err(|e| SmartFitError::InvalidUpstreamResponse {
            operation: MlOperation::VirtualTryOn,
            reason: e.to_string(),
        })?;

        Ok(TryOnResult {
            image,
            confidence: response.confidence,
        })
    }

    async fn health(&self) -> Result<serde_json::Value> {
        let operation = MlOperation::Health;
        let response = self
            .client
            .get(self.endpoint(operation))
            .send()
            .await
            .map_err(|source| SmartFitError::Upstream { operation, source })?;

        self.decode(operation, response).await
    }
}
