use crate::core::calendar::build_events;
use crate::core::features::{calendar_features, date_range, day_type_features, parse_date};
use crate::core::ml::{LabelEncoder, RandomForestClassifier, RandomForestRegressor};
use crate::domain::model::{
    DayPrediction, Evaluation, PredictRequest, PredictResponse, NON_WORKING_DAY, WORKING_DAY,
};
use crate::utils::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::Serialize;

/// The four fitted estimators plus the encoders they were trained against.
#[derive(Debug, Clone)]
pub struct ForecastModels {
    pub temp_min: RandomForestRegressor,
    pub temp_max: RandomForestRegressor,
    pub weather: RandomForestClassifier,
    pub day_type: RandomForestClassifier,
    pub weather_encoder: LabelEncoder,
    pub day_type_encoder: LabelEncoder,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub trained_rows: usize,
    pub test_rows: usize,
    pub n_estimators: usize,
    pub classes: ModelClasses,
}

/// Labels each classifier can emit, in encoder order.
#[derive(Debug, Clone, Serialize)]
pub struct ModelClasses {
    pub weather: Vec<String>,
    pub day_type: Vec<String>,
}

pub struct Forecaster {
    models: ForecastModels,
    evaluation: Evaluation,
    summary: ModelSummary,
    max_range_days: i64,
}

impl Forecaster {
    pub fn new(
        models: ForecastModels,
        evaluation: Evaluation,
        summary: ModelSummary,
        max_range_days: i64,
    ) -> Self {
        Self {
            models,
            evaluation,
            summary,
            max_range_days,
        }
    }

    pub fn evaluation(&self) -> &Evaluation {
        &self.evaluation
    }

    pub fn summary(&self) -> &ModelSummary {
        &self.summary
    }

    pub fn predict_request(&self, request: &PredictRequest) -> Result<PredictResponse> {
        let start = parse_date("start_date", &request.start_date)?;
        let end = parse_date("end_date", &request.end_date)?;
        self.predict(start, end)
    }

    pub fn predict(&self, start: NaiveDate, end: NaiveDate) -> Result<PredictResponse> {
        if start > end {
            return Err(ForecastError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        let days = (end - start).num_days() + 1;
        if days > self.max_range_days {
            return Err(ForecastError::RangeTooLarge {
                days,
                max: self.max_range_days,
            });
        }

        let dates = date_range(start, end);
        let features = calendar_features(&dates);

        let temp_min = self.models.temp_min.predict(&features)?;
        let temp_max = self.models.temp_max.predict(&features)?;
        let weather_codes = self.models.weather.predict(&features)?;
        let weather = decode(&self.models.weather_encoder, &weather_codes)?;

        let day_features = day_type_features(&temp_max, &temp_min, &weather_codes);
        let day_type_codes = self.models.day_type.predict(&day_features)?;
        let day_types = decode(&self.models.day_type_encoder, &day_type_codes)?;

        let working_days_count = day_types.iter().filter(|d| d.as_str() == WORKING_DAY).count() as u64;
        let non_working_days_count = day_types
            .iter()
            .filter(|d| d.as_str() == NON_WORKING_DAY)
            .count() as u64;

        let events = build_events(&dates, &weather, &day_types);

        let predictions = dates
            .iter()
            .zip(temp_min)
            .zip(temp_max)
            .zip(weather)
            .zip(day_types)
            .map(|((((date, temp_min), temp_max), weather), day_type)| DayPrediction {
                date: *date,
                temp_min,
                temp_max,
                weather,
                day_type,
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            "Predicted {} days from {} to {} ({} working, {} non-working)",
            predictions.len(),
            start,
            end,
            working_days_count,
            non_working_days_count
        );

        Ok(PredictResponse {
            evaluation: self.evaluation.clone(),
            working_days_count,
            non_working_days_count,
            events,
            predictions,
        })
    }
}

fn decode(encoder: &LabelEncoder, codes: &[usize]) -> Result<Vec<String>> {
    codes
        .iter()
        .map(|&c| encoder.inverse_transform(c).map(str::to_string))
        .collect()
}
