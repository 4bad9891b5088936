use crate::domain::model::WeatherRecord;
use crate::domain::ports::DataSource;
use crate::utils::error::{ForecastError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Reads the historical dataset from a local CSV file with a header row.
#[derive(Debug, Clone)]
pub struct CsvDataSource {
    path: PathBuf,
}

impl CsvDataSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl DataSource for CsvDataSource {
    async fn load(&self) -> Result<Vec<WeatherRecord>> {
        let bytes = tokio::fs::read(&self.path).await?;
        tracing::debug!("Read {} bytes from {}", bytes.len(), self.path.display());
        parse_records(&bytes)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// 解析 CSV 內容；多餘欄位會被忽略
pub fn parse_records(data: &[u8]) -> Result<Vec<WeatherRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data);

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<WeatherRecord>().enumerate() {
        let record = row?;
        // header is line 1
        let line = index + 2;

        if !record.temp_max.is_finite() || !record.temp_min.is_finite() {
            return Err(ForecastError::DataError {
                message: format!("line {}: temperatures must be finite numbers", line),
            });
        }
        if record.weather.is_empty() {
            return Err(ForecastError::DataError {
                message: format!("line {}: weather is blank", line),
            });
        }
        if record.day_type.is_empty() {
            return Err(ForecastError::DataError {
                message: format!("line {}: day_type is blank", line),
            });
        }
        records.push(record);
    }

    if records.is_empty() {
        return Err(ForecastError::DataError {
            message: "dataset is empty".to_string(),
        });
    }

    Ok(records)
}
