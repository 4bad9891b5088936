use crate::utils::error::{ForecastError, Result};
use std::collections::BTreeSet;

fn check_lengths(y_true: usize, y_pred: usize) -> Result<()> {
    if y_true != y_pred {
        return Err(ForecastError::TrainingError {
            message: format!(
                "y_true has {} values but y_pred has {}",
                y_true, y_pred
            ),
        });
    }
    if y_true == 0 {
        return Err(ForecastError::TrainingError {
            message: "cannot score an empty sample".to_string(),
        });
    }
    Ok(())
}

/// Coefficient of determination. A constant `y_true` scores 1.0 when
/// predicted exactly and 0.0 otherwise.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_lengths(y_true.len(), y_pred.len())?;
    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

pub fn mean_absolute_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_lengths(y_true.len(), y_pred.len())?;
    let total: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).abs()).sum();
    Ok(total / y_true.len() as f64)
}

pub fn accuracy_score(y_true: &[usize], y_pred: &[usize]) -> Result<f64> {
    check_lengths(y_true.len(), y_pred.len())?;
    let hits = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    Ok(hits as f64 / y_true.len() as f64)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fraction as a percentage with two decimals, e.g. `0.81234 -> 81.23`.
pub fn percent(value: f64) -> f64 {
    round2(value * 100.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassScores {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Per-class precision/recall/F1 for every class seen in either vector.
/// `labels[i]` names class index `i`.
pub fn class_scores(y_true: &[usize], y_pred: &[usize], labels: &[String]) -> Result<Vec<ClassScores>> {
    check_lengths(y_true.len(), y_pred.len())?;
    let present: BTreeSet<usize> = y_true.iter().chain(y_pred).copied().collect();

    present
        .into_iter()
        .map(|class| -> Result<ClassScores> {
            let label = labels
                .get(class)
                .cloned()
                .ok_or_else(|| ForecastError::UnknownLabel {
                    column: "report".to_string(),
                    label: class.to_string(),
                })?;
            let tp = y_true
                .iter()
                .zip(y_pred)
                .filter(|(t, p)| **t == class && **p == class)
                .count();
            let predicted = y_pred.iter().filter(|p| **p == class).count();
            let support = y_true.iter().filter(|t| **t == class).count();

            let precision = ratio(tp, predicted);
            let recall = ratio(tp, support);
            let f1 = if precision + recall == 0.0 {
                0.0
            } else {
                2.0 * precision * recall / (precision + recall)
            };

            Ok(ClassScores {
                label,
                precision,
                recall,
                f1,
                support,
            })
        })
        .collect()
}

/// Fixed-width text report: one row per class, then accuracy, macro and
/// support-weighted averages.
pub fn classification_report(y_true: &[usize], y_pred: &[usize], labels: &[String]) -> Result<String> {
    let scores = class_scores(y_true, y_pred, labels)?;
    let accuracy = accuracy_score(y_true, y_pred)?;
    let total = y_true.len();

    let width = scores
        .iter()
        .map(|s| s.label.len())
        .chain(std::iter::once("weighted avg".len()))
        .max()
        .unwrap_or(0);

    let row = |name: &str, p: f64, r: f64, f: f64, support: usize| {
        format!(
            "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}\n",
            name,
            p,
            r,
            f,
            support,
            width = width
        )
    };

    let mut report = format!(
        "{:>width$}  {:>9} {:>9} {:>9} {:>9}\n\n",
        "",
        "precision",
        "recall",
        "f1-score",
        "support",
        width = width
    );
    for s in &scores {
        report.push_str(&row(&s.label, s.precision, s.recall, s.f1, s.support));
    }
    report.push('\n');

    report.push_str(&format!(
        "{:>width$}  {:>9} {:>9} {:>9.2} {:>9}\n",
        "accuracy",
        "",
        "",
        accuracy,
        total,
        width = width
    ));

    let k = scores.len().max(1) as f64;
    let macro_avg = |f: fn(&ClassScores) -> f64| scores.iter().map(f).sum::<f64>() / k;
    report.push_str(&row(
        "macro avg",
        macro_avg(|s| s.precision),
        macro_avg(|s| s.recall),
        macro_avg(|s| s.f1),
        total,
    ));

    let weighted_avg = |f: fn(&ClassScores) -> f64| {
        scores
            .iter()
            .map(|s| f(s) * s.support as f64)
            .sum::<f64>()
            / total as f64
    };
    report.push_str(&row(
        "weighted avg",
        weighted_avg(|s| s.precision),
        weighted_avg(|s| s.recall),
        weighted_avg(|s| s.f1),
        total,
    ));

    Ok(report)
}
