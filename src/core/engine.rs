use crate::core::features::{calendar_features, day_type_features};
use crate::core::forecaster::{ForecastModels, Forecaster, ModelClasses, ModelSummary};
use crate::core::ml::metrics::{
    accuracy_score, classification_report, mean_absolute_error, percent, round2,
};
use crate::core::ml::{
    train_test_split, ForestParams, LabelEncoder, MaxFeatures, RandomForestClassifier,
    RandomForestRegressor, Split,
};
use crate::domain::model::{Evaluation, WeatherRecord};
use crate::domain::ports::{ConfigProvider, DataSource};
use crate::utils::error::{ForecastError, Result};
use crate::utils::monitor::SystemMonitor;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingSettings {
    pub n_estimators: usize,
    pub test_size: f64,
    pub random_seed: u64,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_range_days: i64,
}

impl TrainingSettings {
    pub fn from_provider<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self {
            n_estimators: config.n_estimators(),
            test_size: config.test_size(),
            random_seed: config.random_seed(),
            max_depth: config.max_depth(),
            min_samples_split: config.min_samples_split(),
            min_samples_leaf: config.min_samples_leaf(),
            max_range_days: config.max_range_days(),
        }
    }

    fn forest_params(&self, max_features: MaxFeatures) -> ForestParams {
        ForestParams {
            n_estimators: self.n_estimators,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features,
            bootstrap: true,
            seed: self.random_seed,
        }
    }
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            test_size: 0.2,
            random_seed: 42,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_range_days: 3660,
        }
    }
}

/// Loads the dataset and fits every model once at startup.
pub struct TrainingEngine<D: DataSource> {
    source: D,
    settings: TrainingSettings,
    monitor: SystemMonitor,
}

impl<D: DataSource> TrainingEngine<D> {
    pub fn new(source: D, settings: TrainingSettings) -> Self {
        Self::new_with_monitoring(source, settings, false)
    }

    pub fn new_with_monitoring(source: D, settings: TrainingSettings, monitor: bool) -> Self {
        Self {
            source,
            settings,
            monitor: SystemMonitor::new(monitor),
        }
    }

    pub async fn run(&self) -> Result<Forecaster> {
        tracing::info!("Loading weather data from {}", self.source.describe());
        self.monitor.log_stats("Before load");

        let records = self.source.load().await?;
        tracing::info!("Loaded {} weather records", records.len());
        self.monitor.log_stats("After load");

        tracing::info!(
            "Training 4 forests with {} trees each (test_size={}, seed={})",
            self.settings.n_estimators,
            self.settings.test_size,
            self.settings.random_seed
        );
        let settings = self.settings;
        let forecaster = tokio::task::spawn_blocking(move || fit_models(&records, &settings))
            .await
            .map_err(|e| ForecastError::TaskError {
                message: format!("training task failed: {}", e),
            })??;

        let evaluation = forecaster.evaluation();
        tracing::info!(
            "Temperature models: R² min {}%, max {}% | MAE min {}, max {}",
            evaluation.accuracy_temp_min,
            evaluation.accuracy_temp_max,
            evaluation.mae_temp_min,
            evaluation.mae_temp_max
        );
        tracing::info!(
            "Classifiers: weather accuracy {}%, day type accuracy {}%",
            evaluation.accuracy_weather,
            evaluation.accuracy_day_type
        );
        self.monitor.log_stats("After training");
        self.monitor.log_final_stats();

        Ok(forecaster)
    }
}

/// 編碼、切分、訓練四個模型並以測試集評估
pub fn fit_models(records: &[WeatherRecord], settings: &TrainingSettings) -> Result<Forecaster> {
    if records.is_empty() {
        return Err(ForecastError::DataError {
            message: "dataset is empty".to_string(),
        });
    }

    let weather_encoder = LabelEncoder::fit("weather", records.iter().map(|r| r.weather.as_str()));
    let day_type_encoder =
        LabelEncoder::fit("day_type", records.iter().map(|r| r.day_type.as_str()));

    let dates: Vec<_> = records.iter().map(|r| r.date).collect();
    let x_calendar = calendar_features(&dates);
    let y_temp_min: Vec<f64> = records.iter().map(|r| r.temp_min).collect();
    let y_temp_max: Vec<f64> = records.iter().map(|r| r.temp_max).collect();
    let y_weather = records
        .iter()
        .map(|r| weather_encoder.transform(&r.weather))
        .collect::<Result<Vec<_>>>()?;
    let y_day_type = records
        .iter()
        .map(|r| day_type_encoder.transform(&r.day_type))
        .collect::<Result<Vec<_>>>()?;
    let x_day_type = day_type_features(&y_temp_max, &y_temp_min, &y_weather);

    let split = train_test_split(records.len(), settings.test_size, settings.random_seed)?;
    tracing::debug!(
        "Split {} rows into {} train / {} test",
        records.len(),
        split.train.len(),
        split.test.len()
    );

    let train = |indices: &[usize]| Split::select(indices, &x_calendar);
    let x_train = train(&split.train);
    let x_test = train(&split.test);

    let regressor_params = settings.forest_params(MaxFeatures::All);
    let classifier_params = settings.forest_params(MaxFeatures::Sqrt);

    tracing::debug!("Fitting temp_min regressor");
    let temp_min = RandomForestRegressor::fit(
        &regressor_params,
        &x_train,
        &Split::select(&split.train, &y_temp_min),
    )?;
    tracing::debug!("Fitting temp_max regressor");
    let temp_max = RandomForestRegressor::fit(
        &regressor_params,
        &x_train,
        &Split::select(&split.train, &y_temp_max),
    )?;
    tracing::debug!("Fitting weather classifier");
    let weather = RandomForestClassifier::fit(
        &classifier_params,
        &x_train,
        &Split::select(&split.train, &y_weather),
        weather_encoder.n_classes(),
    )?;
    tracing::debug!("Fitting day_type classifier");
    let day_type = RandomForestClassifier::fit(
        &classifier_params,
        &Split::select(&split.train, &x_day_type),
        &Split::select(&split.train, &y_day_type),
        day_type_encoder.n_classes(),
    )?;

    let y_temp_min_test = Split::select(&split.test, &y_temp_min);
    let y_temp_max_test = Split::select(&split.test, &y_temp_max);
    let y_weather_test = Split::select(&split.test, &y_weather);
    let y_day_type_test = Split::select(&split.test, &y_day_type);

    let weather_pred = weather.predict(&x_test)?;
    let day_type_pred = day_type.predict(&Split::select(&split.test, &x_day_type))?;

    let evaluation = Evaluation {
        accuracy_temp_min: percent(temp_min.score(&x_test, &y_temp_min_test)?),
        accuracy_temp_max: percent(temp_max.score(&x_test, &y_temp_max_test)?),
        mae_temp_min: round2(mean_absolute_error(
            &y_temp_min_test,
            &temp_min.predict(&x_test)?,
        )?),
        mae_temp_max: round2(mean_absolute_error(
            &y_temp_max_test,
            &temp_max.predict(&x_test)?,
        )?),
        accuracy_weather: percent(accuracy_score(&y_weather_test, &weather_pred)?),
        report_weather: classification_report(
            &y_weather_test,
            &weather_pred,
            weather_encoder.classes(),
        )?,
        accuracy_day_type: percent(accuracy_score(&y_day_type_test, &day_type_pred)?),
        report_day_type: classification_report(
            &y_day_type_test,
            &day_type_pred,
            day_type_encoder.classes(),
        )?,
    };

    let summary = ModelSummary {
        trained_rows: split.train.len(),
        test_rows: split.test.len(),
        n_estimators: settings.n_estimators,
        classes: ModelClasses {
            weather: weather_encoder.classes().to_vec(),
            day_type: day_type_encoder.classes().to_vec(),
        },
    };

    let models = ForecastModels {
        temp_min,
        temp_max,
        weather,
        day_type,
        weather_encoder,
        day_type_encoder,
    };

    Ok(Forecaster::new(
        models,
        evaluation,
        summary,
        settings.max_range_days,
    ))
}
