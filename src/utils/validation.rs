use crate::utils::error::{Result, SmartFitError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub const HTTP_SCHEMES: &[&str] = &["http", "https"];
pub const REDIS_SCHEMES: &[&str] = &["redis", "rediss"];

pub fn validate_url(field_name: &str, url_str: &str, schemes: &[&str]) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    let url = Url::parse(url_str)
        .map_err(|e| invalid(field_name, url_str, format!("Invalid URL format: {}", e)))?;

    if !schemes.contains(&url.scheme()) {
        return Err(invalid(
            field_name,
            url_str,
            format!(
                "Unsupported URL scheme: {}. Expected one of: {}",
                url.scheme(),
                schemes.join(", ")
            ),
        ));
    }

    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value
        .as_ref()
        .ok_or_else(|| SmartFitError::MissingConfigError {
            field: field_name.to_string(),
        })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

/// Measurements and confidences must be real, non-negative numbers.
pub fn validate_measurement(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(SmartFitError::ValidationError {
            message: format!("{} must be a non-negative number, got {}", field_name, value),
        });
    }
    Ok(())
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> SmartFitError {
    SmartFitError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("ml_service.base_url", "https://example.com", HTTP_SCHEMES).is_ok());
        assert!(validate_url("ml_service.base_url", "http://localhost:8000", HTTP_SCHEMES).is_ok());
        assert!(validate_url("ml_service.base_url", "", HTTP_SCHEMES).is_err());
        assert!(validate_url("ml_service.base_url", "invalid-url", HTTP_SCHEMES).is_err());
        assert!(validate_url("ml_service.base_url", "ftp://example.com", HTTP_SCHEMES).is_err());
    }

    #[test]
    fn test_validate_redis_url() {
        assert!(validate_url("cache.url", "redis://127.0.0.1:6379", REDIS_SCHEMES).is_ok());
        assert!(validate_url("cache.url", "http://127.0.0.1:6379", REDIS_SCHEMES).is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("server.port", 3001, 1).is_ok());
        assert!(validate_positive_number("server.port", 0, 1).is_err());
    }

    #[test]
    fn test_validate_measurement() {
        assert!(validate_measurement("chest", 92.5).is_ok());
        assert!(validate_measurement("chest", 0.0).is_ok());
        assert!(validate_measurement("chest", -1.0).is_err());
        assert!(validate_measurement("chest", f64::NAN).is_err());
    }
}
