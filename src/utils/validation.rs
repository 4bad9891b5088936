use crate::utils::error::{ForecastError, Result};
use std::fmt::Display;
use std::path::Path;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl Display, reason: impl Into<String>) -> ForecastError {
    ForecastError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_path(field: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field, path, "Path cannot be empty"));
    }
    if path.contains('\0') {
        return Err(invalid(field, path, "Path contains null bytes"));
    }
    Ok(())
}

/// 資料檔副檔名檢查 (不分大小寫)
pub fn validate_file_extension(field: &str, path: &str, allowed: &[&str]) -> Result<()> {
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| invalid(field, path, "File has no extension"))?;

    if allowed.iter().any(|a| a.eq_ignore_ascii_case(extension)) {
        Ok(())
    } else {
        Err(invalid(
            field,
            path,
            format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                extension,
                allowed.join(", ")
            ),
        ))
    }
}

pub fn validate_min<T: PartialOrd + Display + Copy>(field: &str, value: T, min: T) -> Result<()> {
    if value < min {
        return Err(invalid(field, value, format!("Value must be at least {}", min)));
    }
    Ok(())
}

pub fn validate_non_empty_string(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "Value cannot be empty or whitespace-only"));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + Display + Copy>(
    field: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

/// 開區間檢查，例如測試集比例必須介於 0 與 1 之間 (不含端點)
pub fn validate_open_interval(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if !value.is_finite() || value <= min || value >= max {
        return Err(invalid(
            field,
            value,
            format!("Value must be strictly between {} and {}", min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("data.csv_path", "seattle-weather.csv").is_ok());
        assert!(validate_path("data.csv_path", "").is_err());
        assert!(validate_path("data.csv_path", "  ").is_err());
        assert!(validate_path("data.csv_path", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_min() {
        assert!(validate_min("training.n_estimators", 100usize, 1).is_ok());
        assert!(validate_min("training.n_estimators", 0usize, 1).is_err());
        assert!(validate_min("prediction.max_range_days", 0i64, 1).is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension("data.csv_path", "weather.csv", &["csv"]).is_ok());
        assert!(validate_file_extension("data.csv_path", "WEATHER.CSV", &["csv"]).is_ok());
        assert!(validate_file_extension("data.csv_path", "weather.xlsx", &["csv"]).is_err());

        let err = validate_file_extension("data.csv_path", "weather", &["csv"]).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InvalidConfigValueError { ref value, .. } if value == "weather"
        ));
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("server.port", 5001u16, 1, u16::MAX).is_ok());
        assert!(validate_range("server.port", 0u16, 1, u16::MAX).is_err());
    }

    #[test]
    fn test_validate_open_interval() {
        assert!(validate_open_interval("training.test_size", 0.2, 0.0, 1.0).is_ok());
        assert!(validate_open_interval("training.test_size", 0.0, 0.0, 1.0).is_err());
        assert!(validate_open_interval("training.test_size", 1.0, 0.0, 1.0).is_err());
        assert!(validate_open_interval("training.test_size", f64::NAN, 0.0, 1.0).is_err());
    }
}
