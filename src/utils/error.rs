use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data error: {message}")]
    DataError { message: String },

    #[error("Unknown label '{label}' for column '{column}'")]
    UnknownLabel { column: String, label: String },

    #[error("Training error: {message}")]
    TrainingError { message: String },

    #[error("Invalid date '{value}' for field '{field}'")]
    InvalidDate { field: String, value: String },

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: String, end: String },

    #[error("Date range of {days} days exceeds the limit of {max} days")]
    RangeTooLarge { days: i64, max: i64 },

    #[error("Background task failed: {message}")]
    TaskError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Data,
    Model,
    Request,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    High,
    Critical,
}

impl ForecastError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ForecastError::ConfigValidationError { .. }
            | ForecastError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ForecastError::CsvError(_) | ForecastError::DataError { .. } => ErrorCategory::Data,
            ForecastError::UnknownLabel { .. } | ForecastError::TrainingError { .. } => {
                ErrorCategory::Model
            }
            ForecastError::InvalidDate { .. }
            | ForecastError::InvalidDateRange { .. }
            | ForecastError::RangeTooLarge { .. } => ErrorCategory::Request,
            ForecastError::IoError(_)
            | ForecastError::SerializationError(_)
            | ForecastError::TaskError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Request => ErrorSeverity::Low,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Model => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 啟動失敗時的行程結束碼：系統錯誤為 3，其餘為 1
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Critical => 3,
            ErrorSeverity::Low | ErrorSeverity::High => 1,
        }
    }

    /// 請求錯誤由呼叫端修正，不是服務本身的問題
    pub fn is_client_error(&self) -> bool {
        self.category() == ErrorCategory::Request
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ForecastError::CsvError(e) => format!("The weather dataset could not be parsed: {}", e),
            ForecastError::IoError(e) => format!("A file could not be read: {}", e),
            ForecastError::DataError { message } => {
                format!("The weather dataset is not usable: {}", message)
            }
            ForecastError::UnknownLabel { column, label } => {
                format!("Value '{}' was never seen in column '{}'", label, column)
            }
            ForecastError::InvalidDate { field, value } => {
                format!("'{}' is not a valid date for {}", value, field)
            }
            ForecastError::InvalidDateRange { .. } => {
                "Start date must be less than or equal to end date".to_string()
            }
            ForecastError::RangeTooLarge { days, max } => format!(
                "Requested {} days but at most {} days can be predicted at once",
                days, max
            ),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ForecastError::CsvError(_) | ForecastError::DataError { .. } => {
                "Check that the CSV has the columns date, weather, temp_max, temp_min, day_type"
            }
            ForecastError::IoError(_) => "Check that the path exists and is readable",
            ForecastError::SerializationError(_) => "Check the request or response payload format",
            ForecastError::ConfigValidationError { .. }
            | ForecastError::InvalidConfigValueError { .. } => {
                "Review the configuration file and command line flags"
            }
            ForecastError::UnknownLabel { .. } => {
                "Retrain the models on a dataset that contains this label"
            }
            ForecastError::TrainingError { .. } => {
                "Check the training parameters and that the dataset has enough rows"
            }
            ForecastError::InvalidDate { .. } => "Use the YYYY-MM-DD date format",
            ForecastError::InvalidDateRange { .. } => "Swap the start and end dates",
            ForecastError::RangeTooLarge { .. } => "Split the request into smaller date ranges",
            ForecastError::TaskError { .. } => "Restart the service; see the logs for details",
        }
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;
