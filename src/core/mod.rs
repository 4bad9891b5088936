pub mod calendar;
pub mod engine;
pub mod features;
pub mod forecaster;
pub mod ml;

pub use crate::domain::model::{PredictRequest, PredictResponse, WeatherRecord};
pub use crate::domain::ports::{ConfigProvider, DataSource};
pub use crate::utils::error::Result;
