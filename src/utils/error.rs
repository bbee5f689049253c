use crate::domain::model::MlOperation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmartFitError {
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    #[error("Precondition missing: {instruction}")]
    PreconditionMissing {
        instruction: String,
        missing: Vec<String>,
    },

    #[error("{operation} request failed: {source}")]
    Upstream {
        operation: MlOperation,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation} failed: {reason}")]
    UpstreamFailed {
        operation: MlOperation,
        reason: String,
    },

    #[error("{operation} returned HTTP {status}")]
    UpstreamStatus { operation: MlOperation, status: u16 },

    #[error("{operation} returned an invalid response: {reason}")]
    InvalidUpstreamResponse {
        operation: MlOperation,
        reason: String,
    },

    #[error("Action already in flight: {action}")]
    ActionInFlight { action: String },

    #[error("Camera error: {message}")]
    Camera { message: String },

    #[error("Image error: {message}")]
    Image { message: String },

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Fatal startup failure: {message}")]
    FatalStartup { message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

pub type Result<T> = std::result::Result<T, SmartFitError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Upstream,
    Resource,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SmartFitError {
    pub fn precondition(instruction: impl Into<String>, missing: Vec<String>) -> Self {
        Self::PreconditionMissing {
            instruction: instruction.into(),
            missing,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => ErrorCategory::Configuration,
            Self::NotFound { .. }
            | Self::PreconditionMissing { .. }
            | Self::ValidationError { .. }
            | Self::Image { .. } => ErrorCategory::Input,
            Self::Upstream { .. }
            | Self::UpstreamFailed { .. }
            | Self::UpstreamStatus { .. }
            | Self::InvalidUpstreamResponse { .. }
            | Self::Http(_) => ErrorCategory::Upstream,
            Self::ActionInFlight { .. } | Self::Camera { .. } | Self::Cache(_) => {
                ErrorCategory::Resource
            }
            Self::FatalStartup { .. } | Self::IoError(_) | Self::SerializationError(_) => {
                ErrorCategory::Internal
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ActionInFlight { .. } => ErrorSeverity::Low,
            Self::NotFound { .. }
            | Self::PreconditionMissing { .. }
            | Self::ValidationError { .. }
            | Self::Upstream { .. }
            | Self::UpstreamFailed { .. }
            | Self::UpstreamStatus { .. }
            | Self::InvalidUpstreamResponse { .. }
            | Self::Http(_)
            | Self::Cache(_) => ErrorSeverity::Medium,
            Self::Camera { .. }
            | Self::Image { .. }
            | Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. }
            | Self::IoError(_)
            | Self::SerializationError(_) => ErrorSeverity::High,
            Self::FatalStartup { .. } => ErrorSeverity::Critical,
        }
    }

    /// Message safe to show an end user. Upstream failures collapse to the
    /// operation's generic message and never expose transport details.
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Upstream { operation, .. }
            | Self::UpstreamFailed { operation, .. }
            | Self::UpstreamStatus { operation, .. } => {
                operation.failure_message().to_string()
            }
            Self::InvalidUpstreamResponse { operation, .. } => {
                operation.invalid_response_message().to_string()
            }
            Self::PreconditionMissing {
                instruction,
                missing,
            } if !missing.is_empty() => {
                format!("{instruction} (missing: {})", missing.join(", "))
            }
            Self::PreconditionMissing { instruction, .. } => instruction.clone(),
            Self::NotFound { resource, .. } => format!("{resource} not found"),
            Self::ActionInFlight { action } => {
                format!("{action} is already running, please wait")
            }
            Self::Http(_) => "Could not reach the SmartFit backend.".to_string(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "Check the configuration file and environment variables",
            ErrorCategory::Input => "Check the inputs and complete the earlier steps first",
            ErrorCategory::Upstream => "Make sure the ML service and backend are running, then retry",
            ErrorCategory::Resource => "Release the device or wait for the running action to finish",
            ErrorCategory::Internal => "Inspect the logs for details",
        }
    }
}
