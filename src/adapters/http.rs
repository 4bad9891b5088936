//! HTTP interface for the forecaster.

use crate::core::forecaster::{Forecaster, ModelSummary};
use crate::domain::model::{PredictRequest, PredictResponse};
use crate::utils::error::{ForecastError, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Serves `/predict`, `/health` and optional static assets.
pub struct ForecastServer {
    forecaster: Arc<Forecaster>,
    host: String,
    port: u16,
    static_dir: Option<PathBuf>,
}

impl ForecastServer {
    pub fn new(forecaster: Arc<Forecaster>, host: impl Into<String>, port: u16) -> Self {
        Self {
            forecaster,
            host: host.into(),
            port,
            static_dir: None,
        }
    }

    pub fn with_static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Binds the configured address and serves until Ctrl-C.
    pub async fn start(self) -> Result<()> {
        let addr = self.address();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("🌦️  Forecast API listening on http://{}", addr);
        self.serve(listener, shutdown_signal()).await
    }

    /// Serves on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: tokio::net::TcpListener, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let app = self.build_router();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;
        info!("Forecast API stopped");
        Ok(())
    }

    pub fn build_router(self) -> Router {
        let router = Router::new()
            .route("/predict", post(predict))
            .route("/health", get(health_check));

        let router = match self.static_dir {
            Some(dir) => {
                info!("Serving static files from {}", dir.display());
                router.fallback_service(static_files(&dir))
            }
            None => router,
        };

        router
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(self.forecaster)
    }
}

fn static_files(dir: &Path) -> ServeDir<ServeFile> {
    ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[derive(Debug, Serialize)]
struct HealthResponse<'a> {
    status: &'static str,
    #[serde(flatten)]
    summary: &'a ModelSummary,
}

async fn health_check(State(forecaster): State<Arc<Forecaster>>) -> Response {
    Json(HealthResponse {
        status: "ok",
        summary: forecaster.summary(),
    })
    .into_response()
}

async fn predict(
    State(forecaster): State<Arc<Forecaster>>,
    Json(request): Json<PredictRequest>,
) -> std::result::Result<Json<PredictResponse>, ForecastError> {
    let response = predict_blocking(forecaster, request.clone()).await?;
    info!(
        start_date = %request.start_date,
        end_date = %request.end_date,
        days = response.predictions.len(),
        "Prediction served"
    );
    Ok(Json(response))
}

/// Runs the forests off the async workers; long ranges walk every tree per day.
async fn predict_blocking(
    forecaster: Arc<Forecaster>,
    request: PredictRequest,
) -> Result<PredictResponse> {
    tokio::task::spawn_blocking(move || forecaster.predict_request(&request))
        .await
        .map_err(|e| ForecastError::TaskError {
            message: format!("prediction task failed: {}", e),
        })?
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    suggestion: &'static str,
}

impl IntoResponse for ForecastError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        if status.is_server_error() {
            tracing::error!(
                "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
                self,
                self.category(),
                self.severity()
            );
        } else {
            warn!("Rejected request: {}", self);
        }

        let body = ErrorBody {
            error: self.user_friendly_message(),
            suggestion: self.recovery_suggestion(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::core::engine::{fit_models, test_support::seasonal_records, TrainingSettings};
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_predict_runs_on_blocking_pool() {
        let records = seasonal_records(NaiveDate::from_ymd_opt(2012, 1, 1).unwrap(), 365);
        let settings = TrainingSettings {
            n_estimators: 4,
            ..TrainingSettings::default()
        };
        let forecaster = Arc::new(fit_models(&records, &settings).unwrap());

        let response = predict_blocking(
            Arc::clone(&forecaster),
            PredictRequest {
                start_date: "2013-01-01".to_string(),
                end_date: "2013-01-10".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(response.predictions.len(), 10);

        let err = predict_blocking(
            forecaster,
            PredictRequest {
                start_date: "2013-02-01".to_string(),
                end_date: "2013-01-01".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ForecastError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_client_errors_map_to_bad_request() {
        let response = ForecastError::InvalidDate {
            field: "start_date".to_string(),
            value: "soon".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_model_errors_map_to_server_error() {
        let response = ForecastError::UnknownLabel {
            column: "weather".to_string(),
            label: "9".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
