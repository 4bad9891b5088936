use crate::domain::model::{CalendarEvent, EventClass, WORKING_DAY};
use chrono::NaiveDate;

/// Rain and snow take precedence over the day type.
pub fn classify_event(weather: &str, day_type: &str) -> EventClass {
    match weather {
        "rain" => EventClass::Rain,
        "snow" => EventClass::Snow,
        _ if day_type == WORKING_DAY => EventClass::WorkingDay,
        _ => EventClass::ColdDay,
    }
}

pub fn build_events<S: AsRef<str>>(
    dates: &[NaiveDate],
    weather: &[S],
    day_types: &[S],
) -> Vec<CalendarEvent> {
    dates
        .iter()
        .zip(weather)
        .zip(day_types)
        .map(|((date, weather), day_type)| CalendarEvent {
            start: *date,
            class_name: classify_event(weather.as_ref(), day_type.as_ref()),
        })
        .collect()
}
