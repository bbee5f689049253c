use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, SmartFitError};
use crate::utils::validation::{self, Validate, HTTP_SCHEMES, REDIS_SCHEMES};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub ml_service: MlServiceConfig,
    pub backend: BackendConfig,
    pub cache: CacheConfig,
    pub session: SessionConfig,
    pub camera: CameraConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Production,
    Test,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl FromStr for RuntimeEnvironment {
    type Err = SmartFitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => Err(SmartFitError::InvalidConfigValueError {
                field: "server.environment".to_string(),
                value: other.to_string(),
                reason: "Expected development, production or test".to_string(),
            }),
        }
    }
}

impl fmt::Display for RuntimeEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: RuntimeEnvironment,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            environment: RuntimeEnvironment::Development,
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MlServiceConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for MlServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub url: Option<String>,
    pub connect_timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: None,
            connect_timeout_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub directory: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            directory: "./.smartfit".to_string(),
        }
    }
}

/// Capture command that streams MJPEG on stdout, e.g.
/// `["ffmpeg", "-f", "v4l2", "-i", "/dev/video0", "-f", "mjpeg", "-"]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub command: Option<Vec<String>>,
    pub frame_timeout_seconds: u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            command: None,
            frame_timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads a TOML file, then applies environment overrides.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SmartFitError::IoError)?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Defaults plus environment overrides, for running without a file.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content, |key| std::env::var(key).ok())?;

        let mut config: Self =
            toml::from_str(&processed_content).map_err(|e| SmartFitError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;
        config.normalize();
        Ok(config)
    }

    /// Replaces `${VAR}` references. Unset variables become empty strings.
    fn substitute_env_vars<F>(content: &str, lookup: F) -> Result<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| SmartFitError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            lookup(var_name).unwrap_or_else(|| {
                tracing::debug!("{} not set, substituting empty value", var_name);
                String::new()
            })
        });

        Ok(result.to_string())
    }

    /// `SMARTFIT_PORT`, `SMARTFIT_ENV`, `REDIS_URL` and `ML_SERVICE_URL` win over the file.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("SMARTFIT_PORT") {
            self.server.port =
                port.trim()
                    .parse()
                    .map_err(|_| SmartFitError::InvalidConfigValueError {
                        field: "SMARTFIT_PORT".to_string(),
                        value: port.clone(),
                        reason: "Expected a port number".to_string(),
                    })?;
        }
        if let Some(env) = lookup("SMARTFIT_ENV") {
            self.server.environment = env.parse()?;
        }
        if let Some(url) = lookup("REDIS_URL") {
            self.cache.url = Some(url);
        }
        if let Some(url) = lookup("ML_SERVICE_URL") {
            self.ml_service.base_url = url;
        }
        self.normalize();
        Ok(())
    }

    fn normalize(&mut self) {
        if self
            .cache
            .url
            .as_deref()
            .is_some_and(|url| url.trim().is_empty())
        {
            self.cache.url = None;
        }
        if self
            .camera
            .command
            .as_ref()
            .is_some_and(|cmd| cmd.is_empty())
        {
            self.camera.command = None;
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("server.host", &self.server.host)?;
        validation::validate_positive_number("server.port", u64::from(self.server.port), 1)?;

        validation::validate_url("ml_service.base_url", &self.ml_service.base_url, HTTP_SCHEMES)?;
        validation::validate_positive_number(
            "ml_service.timeout_seconds",
            self.ml_service.timeout_seconds,
            1,
        )?;
        validation::validate_url("backend.base_url", &self.backend.base_url, HTTP_SCHEMES)?;

        if let Some(url) = &self.cache.url {
            validation::validate_url("cache.url", url, REDIS_SCHEMES)?;
        }
        validation::validate_positive_number(
            "cache.connect_timeout_ms",
            self.cache.connect_timeout_ms,
            1,
        )?;

        validation::validate_path("session.directory", &self.session.directory)?;

        if let Some(command) = &self.camera.command {
            let program = command
                .first()
                .ok_or_else(|| SmartFitError::MissingConfigError {
                    field: "camera.command".to_string(),
                })?;
            validation::validate_non_empty_string("camera.command", program)?;
        }
        validation::validate_positive_number(
            "camera.frame_timeout_seconds",
            self.camera.frame_timeout_seconds,
            1,
        )?;

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn cache_connect_timeout(&self) -> Duration {
        Duration::from_millis(self.cache.connect_timeout_ms)
    }
}

impl ConfigProvider for AppConfig {
    fn ml_service_url(&self) -> &str {
        &self.ml_service.base_url
    }

    fn backend_url(&self) -> &str {
        &self.backend.base_url
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.ml_service.timeout_seconds)
    }

    fn session_directory(&self) -> &str {
        &self.session.directory
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
