use crate::utils::error::{ForecastError, Result};
use serde::Serialize;

/// Maps string labels to dense indices; classes are kept in sorted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelEncoder {
    column: String,
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit<I, S>(column: &str, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut classes: Vec<String> = labels.into_iter().map(|l| l.as_ref().to_string()).collect();
        classes.sort();
        classes.dedup();
        Self {
            column: column.to_string(),
            classes,
        }
    }

    pub fn transform(&self, label: &str) -> Result<usize> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .map_err(|_| ForecastError::UnknownLabel {
                column: self.column.clone(),
                label: label.to_string(),
            })
    }

    pub fn transform_all<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<usize>> {
        labels.iter().map(|l| self.transform(l.as_ref())).collect()
    }

    pub fn inverse_transform(&self, index: usize) -> Result<&str> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| ForecastError::UnknownLabel {
                column: self.column.clone(),
                label: index.to_string(),
            })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes_are_sorted_and_unique() {
        let encoder = LabelEncoder::fit("weather", ["sun", "rain", "drizzle", "rain", "sun"]);
        assert_eq!(encoder.classes(), &["drizzle", "rain", "sun"]);
        assert_eq!(encoder.transform("rain").unwrap(), 1);
        assert_eq!(encoder.inverse_transform(2).unwrap(), "sun");
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        let encoder = LabelEncoder::fit("day_type", ["Working Day", "Non-working Day"]);
        let err = encoder.transform("Holiday").unwrap_err();
        assert!(matches!(err, ForecastError::UnknownLabel { ref column, .. } if column == "day_type"));
        assert!(encoder.inverse_transform(5).is_err());
    }

    #[test]
    fn test_transform_all() {
        let encoder = LabelEncoder::fit("weather", ["snow", "fog"]);
        assert_eq!(encoder.transform_all(&["snow", "fog", "snow"]).unwrap(), vec![1, 0, 1]);
    }
}
