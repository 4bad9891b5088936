use crate::core::ConfigProvider;
use crate::utils::error::{ForecastError, Result};
use crate::utils::validation::{
    validate_file_extension, validate_min, validate_non_empty_string, validate_open_interval,
    validate_path, validate_range, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub training: TrainingConfig,
    pub prediction: PredictionConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub csv_path: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_path: "seattle-weather.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub n_estimators: usize,
    pub test_size: f64,
    pub random_seed: u64,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            test_size: 0.2,
            random_seed: 42,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    pub max_range_days: i64,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            max_range_days: 3660,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is a valid regex"))
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ForecastError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ForecastError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${WEATHER_CSV})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("server.host", &self.server.host)?;
        validate_range("server.port", self.server.port, 1, u16::MAX)?;
        if let Some(dir) = &self.server.static_dir {
            validate_path("server.static_dir", dir)?;
        }

        validate_path("data.csv_path", &self.data.csv_path)?;
        validate_file_extension("data.csv_path", &self.data.csv_path, &["csv"])?;

        validate_min("training.n_estimators", self.training.n_estimators, 1)?;
        validate_open_interval("training.test_size", self.training.test_size, 0.0, 1.0)?;
        validate_min(
            "training.min_samples_split",
            self.training.min_samples_split,
            2,
        )?;
        validate_min(
            "training.min_samples_leaf",
            self.training.min_samples_leaf,
            1,
        )?;
        if let Some(depth) = self.training.max_depth {
            validate_min("training.max_depth", depth, 1)?;
        }

        validate_min("prediction.max_range_days", self.prediction.max_range_days, 1)?;

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.enabled
    }
}

impl ConfigProvider for TomlConfig {
    fn data_path(&self) -> &str {
        &self.data.csv_path
    }

    fn n_estimators(&self) -> usize {
        self.training.n_estimators
    }

    fn test_size(&self) -> f64 {
        self.training.test_size
    }

    fn random_seed(&self) -> u64 {
        self.training.random_seed
    }

    fn max_depth(&self) -> Option<usize> {
        self.training.max_depth
    }

    fn min_samples_split(&self) -> usize {
        self.training.min_samples_split
    }

    fn min_samples_leaf(&self) -> usize {
        self.training.min_samples_leaf
    }

    fn max_range_days(&self) -> i64 {
        self.prediction.max_range_days
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[server]
host = "127.0.0.1"
port = 8080
static_dir = "static"

[data]
csv_path = "data/seattle-weather.csv"

[training]
n_estimators = 25
test_size = 0.25
random_seed = 7
max_depth = 12

[prediction]
max_range_days = 366

[monitoring]
enabled = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.static_dir.as_deref(), Some("static"));
        assert_eq!(config.data_path(), "data/seattle-weather.csv");
        assert_eq!(config.n_estimators(), 25);
        assert_eq!(config.test_size(), 0.25);
        assert_eq!(config.random_seed(), 7);
        assert_eq!(config.max_depth(), Some(12));
        assert_eq!(config.min_samples_split(), 2);
        assert_eq!(config.max_range_days(), 366);
        assert!(config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config, TomlConfig::default());
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.data_path(), "seattle-weather.csv");
        assert_eq!(config.n_estimators(), 100);
        assert_eq!(config.random_seed(), 42);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("FORECAST_TEST_CSV", "/srv/weather/history.csv");

        let toml_content = r#"
[data]
csv_path = "${FORECAST_TEST_CSV}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.data.csv_path, "/srv/weather/history.csv");

        std::env::remove_var("FORECAST_TEST_CSV");
    }

    #[test]
    fn test_unset_env_var_is_left_in_place() {
        let toml_content = r#"
[data]
csv_path = "${FORECAST_TEST_NEVER_SET}"
"#;
        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.data.csv_path, "${FORECAST_TEST_NEVER_SET}");
    }

    #[test]
    fn test_config_validation() {
        let invalid = [
            "[training]\ntest_size = 1.0",
            "[training]\nn_estimators = 0",
            "[training]\nmin_samples_split = 1",
            "[server]\nport = 0",
            "[data]\ncsv_path = \"weather.json\"",
            "[prediction]\nmax_range_days = 0",
        ];
        for content in invalid {
            let config = TomlConfig::from_toml_str(content).unwrap();
            assert!(config.validate().is_err(), "expected '{}' to fail", content);
        }
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let err = TomlConfig::from_toml_str("[server\nport = ").unwrap_err();
        assert!(matches!(err, ForecastError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nport = 9000\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.server.port, 9000);
    }
}
