use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use weather_forecast::domain::ports::ConfigProvider;
use weather_forecast::utils::logger;
use weather_forecast::{
    CliConfig, CsvDataSource, ForecastError, ForecastServer, TrainingEngine, TrainingSettings,
};

fn report_and_exit(stage: &str, e: ForecastError) -> ! {
    tracing::error!(
        "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
        stage,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting weather-forecast");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = cli
        .resolve()
        .unwrap_or_else(|e| report_and_exit("Configuration", e));
    tracing::info!("✅ Configuration loaded and validated successfully");

    let monitor_enabled = config.monitoring_enabled();
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let source = CsvDataSource::new(config.data_path());
    let engine = TrainingEngine::new_with_monitoring(
        source,
        TrainingSettings::from_provider(&config),
        monitor_enabled,
    );

    let forecaster = engine
        .run()
        .await
        .unwrap_or_else(|e| report_and_exit("Training", e));
    tracing::info!("✅ Models trained");

    let server = ForecastServer::new(
        Arc::new(forecaster),
        config.server.host.clone(),
        config.server.port,
    )
    .with_static_dir(config.server.static_dir.as_ref().map(PathBuf::from));

    server.start().await?;
    Ok(())
}
