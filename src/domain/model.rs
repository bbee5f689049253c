use crate::utils::error::{Result, SmartFitError};
use crate::utils::validation::validate_measurement;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Calls made against the external ML inference service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MlOperation {
    PoseEstimation,
    BodyMeasurement,
    VirtualTryOn,
    Health,
}

impl MlOperation {
    pub fn path(&self) -> &'static str {
        match self {
            Self::PoseEstimation => "/pose-estimation",
            Self::BodyMeasurement => "/body-measurement",
            Self::VirtualTryOn => "/virtual-tryon",
            Self::Health => "/health",
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            Self::PoseEstimation => "Pose estimation failed.",
            Self::BodyMeasurement => "Error fetching measurements from ML.",
            Self::VirtualTryOn => "Virtual try-on failed.",
            Self::Health => "ML service is not reachable.",
        }
    }

    pub fn invalid_response_message(&self) -> &'static str {
        match self {
            Self::BodyMeasurement => "Failed to get measurements from ML.",
            Self::VirtualTryOn => "No result image returned.",
            other => other.failure_message(),
        }
    }
}

impl fmt::Display for MlOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PoseEstimation => "pose estimation",
            Self::BodyMeasurement => "body measurement",
            Self::VirtualTryOn => "virtual try-on",
            Self::Health => "health check",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// Sniffs the format from magic bytes.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
        if bytes.starts_with(PNG_MAGIC) {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else {
            None
        }
    }
}

/// An encoded still image plus the format it is declared as.
///
/// Serialized as a `data:` URL so the session file stays a single JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImagePayload {
    bytes: Vec<u8>,
    format: ImageFormat,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, format: ImageFormat) -> Self {
        Self { bytes, format }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let format = ImageFormat::detect(&bytes).ok_or_else(|| SmartFitError::Image {
            message: "unsupported image format, expected PNG or JPEG".to_string(),
        })?;
        Ok(Self { bytes, format })
    }

    /// Decodes raw base64 whose format is declared by the producer.
    pub fn from_base64(encoded: &str, format: ImageFormat) -> Result<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| SmartFitError::Image {
                message: format!("invalid base64 image data: {}", e),
            })?;
        Ok(Self { bytes, format })
    }

    /// Accepts either a `data:image/...;base64,` URL or bare base64.
    pub fn from_data_url(value: &str) -> Result<Self> {
        let Some(rest) = value.strip_prefix("data:") else {
            let bytes = STANDARD
                .decode(value.trim())
                .map_err(|e| SmartFitError::Image {
                    message: format!("invalid base64 image data: {}", e),
                })?;
            return Self::from_bytes(bytes);
        };

        let (header, data) = rest.split_once(',').ok_or_else(|| SmartFitError::Image {
            message: "data URL has no payload".to_string(),
        })?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| SmartFitError::Image {
                message: "only base64 data URLs are supported".to_string(),
            })?;
        let format = ImageFormat::from_mime(mime).ok_or_else(|| SmartFitError::Image {
            message: format!("unsupported image media type: {}", mime),
        })?;

        Self::from_base64(data, format)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.format.mime(), self.to_base64())
    }
}

impl TryFrom<String> for ImagePayload {
    type Error = SmartFitError;

    fn try_from(value: String) -> Result<Self> {
        Self::from_data_url(&value)
    }
}

impl From<ImagePayload> for String {
    fn from(value: ImagePayload) -> Self {
        value.to_data_url()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub price: f64,
    pub image: String,
    pub description: String,
}

/// Result of the pose service. Only `pose_data` is interpreted downstream;
/// everything else is kept verbatim for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    pub pose_data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PoseResult {
    pub fn landmark_count(&self) -> usize {
        self.pose_data
            .get("landmarks")
            .and_then(|v| v.as_array())
            .map(Vec::len)
            .unwrap_or(0)
    }
}

/// Named body dimensions in centimetres.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Measurements(pub BTreeMap<String, f64>);

impl Measurements {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in &self.0 {
            validate_measurement(name, *value)?;
        }
        Ok(())
    }
}

pub const MEASUREMENT_FIELDS: [&str; 5] = ["height", "chest", "waist", "hips", "inseam"];

/// Client-editable measurement fields. Starts with the canonical five,
/// all blank; a fetch from the ML service replaces the whole field set.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementForm {
    fields: BTreeMap<String, Option<f64>>,
}

impl Default for MeasurementForm {
    fn default() -> Self {
        Self {
            fields: MEASUREMENT_FIELDS
                .iter()
                .map(|name| (name.to_string(), None))
                .collect(),
        }
    }
}

impl MeasurementForm {
    pub fn from_measurements(measurements: &Measurements) -> Self {
        let mut form = Self::default();
        form.replace_with(measurements);
        form
    }

    pub fn set(&mut self, name: &str, value: f64) -> Result<()> {
        validate_measurement(name, value)?;
        self.fields.insert(name.to_string(), Some(value));
        Ok(())
    }

    pub fn clear(&mut self, name: &str) {
        if let Some(slot) = self.fields.get_mut(name) {
            *slot = None;
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied().flatten()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn replace_with(&mut self, measurements: &Measurements) {
        self.fields = measurements
            .0
            .iter()
            .map(|(name, value)| (name.clone(), Some(*value)))
            .collect();
    }

    /// Filled fields only.
    pub fn to_measurements(&self) -> Measurements {
        Measurements(
            self.fields
                .iter()
                .filter_map(|(name, value)| value.map(|v| (name.clone(), v)))
                .collect(),
        )
    }
}

/// Session-local shopping cart. Order of insertion is kept; duplicates allowed.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<Product>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, product: Product) {
        self.items.push(product);
    }

    pub fn items(&self) -> &[Product] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total(&self) -> f64 {
        let cents: i64 = self
            .items
            .iter()
            .map(|p| (p.price * 100.0).round() as i64)
            .sum();
        cents as f64 / 100.0
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Wire body of the unified try-on endpoint. Images travel as bare base64.
#[derive(Debug, Clone, Serialize)]
pub struct TryOnRequest {
    pub body_image: String,
    pub garment_image: String,
    pub pose_data: serde_json::Value,
    pub measurements: Measurements,
}

impl TryOnRequest {
    pub fn new(
        body: &ImagePayload,
        garment: &ImagePayload,
        pose_data: serde_json::Value,
        measurements: Measurements,
    ) -> Self {
        Self {
            body_image: body.to_base64(),
            garment_image: garment.to_base64(),
            pose_data,
            measurements,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TryOnResult {
    pub image: ImagePayload,
    pub confidence: Option<f64>,
}

impl TryOnResult {
    /// The try-on endpoint declares JPEG output.
    pub const FORMAT: ImageFormat = ImageFormat::Jpeg;

    /// `tryon-result.<ext>` matching the format actually returned.
    pub fn default_file_name(&self) -> String {
        format!("tryon-result.{}", self.image.format().extension())
    }
}
