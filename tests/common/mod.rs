#![allow(dead_code)]

use chrono::{Datelike, NaiveDate, Weekday};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use weather_forecast::{CsvDataSource, ForecastServer, Forecaster, TrainingEngine, TrainingSettings};

/// 產生具季節性的測試資料 (含 precipitation 與 wind 多餘欄位)
pub fn seasonal_csv(start: NaiveDate, days: usize) -> String {
    let mut csv = String::from("date,precipitation,temp_max,temp_min,wind,weather,day_type\n");
    for date in start.iter_days().take(days) {
        let doy = date.ordinal() as f64;
        let season = (2.0 * std::f64::consts::PI * (doy - 15.0) / 365.0).cos();
        let temp_max = 16.0 - 10.0 * season;
        let temp_min = temp_max - 7.0;
        let weather = if temp_max < 7.5 && date.day() % 4 == 0 {
            "snow"
        } else if season > 0.3 && date.day() % 2 == 0 {
            "rain"
        } else {
            "sun"
        };
        let day_type = match date.weekday() {
            Weekday::Sat | Weekday::Sun => "Non-working Day",
            _ => "Working Day",
        };
        csv.push_str(&format!(
            "{},0.0,{:.1},{:.1},3.2,{},{}\n",
            date, temp_max, temp_min, weather, day_type
        ));
    }
    csv
}

pub fn write_seasonal_csv(dir: &Path, days: usize) -> PathBuf {
    let path = dir.join("seattle-weather.csv");
    let start = NaiveDate::from_ymd_opt(2012, 1, 1).unwrap();
    std::fs::write(&path, seasonal_csv(start, days)).unwrap();
    path
}

pub fn quick_settings() -> TrainingSettings {
    TrainingSettings {
        n_estimators: 8,
        ..TrainingSettings::default()
    }
}

pub async fn train_from(path: &Path) -> Forecaster {
    TrainingEngine::new(CsvDataSource::new(path), quick_settings())
        .run()
        .await
        .unwrap()
}

pub struct TestServer {
    pub base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(forecaster: Forecaster, static_dir: Option<PathBuf>) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        let server = ForecastServer::new(Arc::new(forecaster), "127.0.0.1", addr.port())
            .with_static_dir(static_dir);
        let handle = tokio::spawn(async move {
            server
                .serve(listener, async {
                    let _ = rx.await;
                })
                .await
                .unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            shutdown: Some(tx),
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await.unwrap();
    }
}
