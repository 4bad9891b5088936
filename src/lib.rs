pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::toml_config::TomlConfig;

pub use adapters::{csv_source::CsvDataSource, http::ForecastServer};
pub use crate::core::{
    engine::{TrainingEngine, TrainingSettings},
    forecaster::Forecaster,
};
pub use utils::error::{ForecastError, Result};
