#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Serialize, Deserialize, Parser)]
#[command(name = "weather-forecast")]
#[command(about = "Train weather forests on historical data and serve date-range predictions")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Historical weather CSV (overrides data.csv_path)
    #[arg(long)]
    pub data: Option<String>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    /// Directory with index.html and assets (overrides server.static_dir)
    #[arg(long)]
    pub static_dir: Option<String>,

    /// Number of trees per forest (overrides training.n_estimators)
    #[arg(long)]
    pub trees: Option<usize>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(long, help = "Log CPU and memory usage while training")]
    pub monitor: bool,
}
