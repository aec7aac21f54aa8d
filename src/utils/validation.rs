use crate::utils::error::{HarnessError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(HarnessError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(HarnessError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(HarnessError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(HarnessError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(HarnessError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(HarnessError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_positive_fraction(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(HarnessError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value must be a finite number greater than 0".to_string(),
        });
    }
    Ok(())
}

pub fn validate_duration_secs(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(HarnessError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Timeout must be a finite number of seconds greater than 0".to_string(),
        });
    }
    Ok(())
}

pub fn validate_status_codes(field_name: &str, codes: &[u16]) -> Result<()> {
    for code in codes {
        if !(100..=599).contains(code) {
            return Err(HarnessError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: code.to_string(),
                reason: "Not an HTTP status code".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("old_url", "http://127.0.0.1:1325").is_ok());
        assert!(validate_url("old_url", "https://example.com").is_ok());
        assert!(validate_url("old_url", "").is_err());
        assert!(validate_url("old_url", "invalid-url").is_err());
        assert!(validate_url("old_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_fraction() {
        assert!(validate_positive_fraction("sample_rate", 0.001).is_ok());
        assert!(validate_positive_fraction("sample_rate", 2.0).is_ok());
        assert!(validate_positive_fraction("sample_rate", 0.0).is_err());
        assert!(validate_positive_fraction("sample_rate", -0.5).is_err());
        assert!(validate_positive_fraction("sample_rate", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("workers", 4, 1).is_ok());
        assert!(validate_positive_number("workers", 0, 1).is_err());
    }

    #[test]
    fn test_validate_status_codes() {
        assert!(validate_status_codes("retry.status_forcelist", &[503, 504]).is_ok());
        assert!(validate_status_codes("retry.status_forcelist", &[42]).is_err());
    }
}
