use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const WORKING_DAY: &str = "Working Day";
pub const NON_WORKING_DAY: &str = "Non-working Day";

/// One row of the historical weather CSV. Columns not listed here are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub date: NaiveDate,
    pub weather: String,
    pub temp_max: f64,
    pub temp_min: f64,
    pub day_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventClass {
    #[serde(rename = "rain-style")]
    Rain,
    #[serde(rename = "snow-style")]
    Snow,
    #[serde(rename = "working-day")]
    WorkingDay,
    #[serde(rename = "cold-day")]
    ColdDay,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub start: NaiveDate,
    #[serde(rename = "className")]
    pub class_name: EventClass,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPrediction {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Temp Min Predictions")]
    pub temp_min: f64,
    #[serde(rename = "Temp Max Predictions")]
    pub temp_max: f64,
    #[serde(rename = "Weather Predictions")]
    pub weather: String,
    #[serde(rename = "Day Type Predictions")]
    pub day_type: String,
}

/// Hold-out metrics computed once after training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub accuracy_temp_min: f64,
    pub accuracy_temp_max: f64,
    pub mae_temp_min: f64,
    pub mae_temp_max: f64,
    pub accuracy_weather: f64,
    pub report_weather: String,
    pub accuracy_day_type: f64,
    pub report_day_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    #[serde(flatten)]
    pub evaluation: Evaluation,
    pub working_days_count: u64,
    pub non_working_days_count: u64,
    pub events: Vec<CalendarEvent>,
    pub predictions: Vec<DayPrediction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calendar_event_serializes_class_name() {
        let event = CalendarEvent {
            start: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            class_name: EventClass::Snow,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"start": "2024-03-01", "className": "snow-style"})
        );
    }

    #[test]
    fn test_day_prediction_uses_display_keys() {
        let row = DayPrediction {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            temp_min: 2.5,
            temp_max: 11.0,
            weather: "rain".to_string(),
            day_type: WORKING_DAY.to_string(),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["Date"], "2024-03-01");
        assert_eq!(json["Temp Min Predictions"], 2.5);
        assert_eq!(json["Weather Predictions"], "rain");
        assert_eq!(json["Day Type Predictions"], "Working Day");
    }
}
