use crate::utils::error::{ForecastError, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Ordinal day within the year, 1..=366.
pub fn day_of_year(date: NaiveDate) -> f64 {
    date.ordinal() as f64
}

/// Inclusive daily range; empty when `start > end`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// 接受 YYYY-MM-DD 或 RFC 3339 時間戳 (只取日期部分)
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.date_naive());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Ok(ts.date());
    }

    Err(ForecastError::InvalidDate {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Features for the temperature and weather models.
pub fn calendar_features(dates: &[NaiveDate]) -> Vec<Vec<f64>> {
    dates.iter().map(|d| vec![day_of_year(*d)]).collect()
}

/// Features for the day-type model: `[temp_max, temp_min, weather_code]`.
pub fn day_type_features(temp_max: &[f64], temp_min: &[f64], weather: &[usize]) -> Vec<Vec<f64>> {
    temp_max
        .iter()
        .zip(temp_min)
        .zip(weather)
        .map(|((max, min), code)| vec![*max, *min, *code as f64])
        .collect()
}
