//! Bootstrap-aggregated decision tree ensembles.

use crate::core::ml::metrics::r2_score;
use crate::core::ml::tree::{validate_rows, Criterion, DecisionTree, Gini, SquaredError, TreeParams};
use crate::utils::error::{ForecastError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// How many features each split considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxFeatures {
    All,
    Sqrt,
}

impl MaxFeatures {
    fn resolve(self, n_features: usize) -> Option<usize> {
        match self {
            MaxFeatures::All => None,
            MaxFeatures::Sqrt => Some(((n_features as f64).sqrt() as usize).max(1)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    pub seed: u64,
}

impl ForestParams {
    pub fn regressor_defaults() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            bootstrap: true,
            seed: 42,
        }
    }

    pub fn classifier_defaults() -> Self {
        Self {
            max_features: MaxFeatures::Sqrt,
            ..Self::regressor_defaults()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn tree_params(&self, n_features: usize) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features.resolve(n_features),
        }
    }
}

/// 每棵樹使用獨立的子種子，確保相同種子下結果可重現
fn grow_trees<C: Criterion>(
    criterion: &C,
    params: &ForestParams,
    rows: &[Vec<f64>],
    targets: &[C::Target],
) -> Result<Vec<DecisionTree>> {
    if params.n_estimators == 0 {
        return Err(ForecastError::TrainingError {
            message: "n_estimators must be at least 1".to_string(),
        });
    }
    let n_features = validate_rows(rows)?;
    let tree_params = params.tree_params(n_features);
    let n = rows.len();

    let mut master = StdRng::seed_from_u64(params.seed);
    let mut trees = Vec::with_capacity(params.n_estimators);

    for _ in 0..params.n_estimators {
        let mut rng = StdRng::seed_from_u64(master.random::<u64>());
        let samples: Vec<usize> = if params.bootstrap {
            (0..n).map(|_| rng.random_range(0..n)).collect()
        } else {
            (0..n).collect()
        };
        trees.push(DecisionTree::fit(
            criterion,
            &tree_params,
            rows,
            targets,
            &samples,
            &mut rng,
        )?);
    }

    Ok(trees)
}

fn check_width(expected: usize, rows: &[Vec<f64>]) -> Result<()> {
    if let Some(row) = rows.iter().find(|r| r.len() != expected) {
        return Err(ForecastError::TrainingError {
            message: format!(
                "expected {} features per row, got {}",
                expected,
                row.len()
            ),
        });
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl RandomForestRegressor {
    pub fn fit(params: &ForestParams, rows: &[Vec<f64>], targets: &[f64]) -> Result<Self> {
        if targets.iter().any(|y| !y.is_finite()) {
            return Err(ForecastError::TrainingError {
                message: "regression targets must be finite".to_string(),
            });
        }
        let trees = grow_trees(&SquaredError, params, rows, targets)?;
        let n_features = trees.first().map(|t| t.n_features()).unwrap_or_default();
        Ok(Self { trees, n_features })
    }

    pub fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        check_width(self.n_features, rows)?;
        let n_trees = self.trees.len() as f64;
        Ok(rows
            .iter()
            .map(|row| {
                self.trees
                    .iter()
                    .map(|tree| tree.predict_row(row)[0])
                    .sum::<f64>()
                    / n_trees
            })
            .collect())
    }

    /// Coefficient of determination on the given data.
    pub fn score(&self, rows: &[Vec<f64>], targets: &[f64]) -> Result<f64> {
        let predictions = self.predict(rows)?;
        r2_score(targets, &predictions)
    }

    pub fn n_estimators(&self) -> usize {
        self.trees.len()
    }
}

#[derive(Debug, Clone)]
pub struct RandomForestClassifier {
    trees: Vec<DecisionTree>,
    n_features: usize,
    n_classes: usize,
}

impl RandomForestClassifier {
    /// `targets` are class indices in `0..n_classes`.
    pub fn fit(
        params: &ForestParams,
        rows: &[Vec<f64>],
        targets: &[usize],
        n_classes: usize,
    ) -> Result<Self> {
        if n_classes == 0 {
            return Err(ForecastError::TrainingError {
                message: "classifier needs at least one class".to_string(),
            });
        }
        if let Some(&bad) = targets.iter().find(|&&y| y >= n_classes) {
            return Err(ForecastError::TrainingError {
                message: format!("class index {} outside 0..{}", bad, n_classes),
            });
        }
        let trees = grow_trees(&Gini { n_classes }, params, rows, targets)?;
        let n_features = trees.first().map(|t| t.n_features()).unwrap_or_default();
        Ok(Self {
            trees,
            n_features,
            n_classes,
        })
    }

    /// Mean class probabilities across all trees.
    pub fn predict_proba(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        check_width(self.n_features, rows)?;
        let n_trees = self.trees.len() as f64;
        Ok(rows
            .iter()
            .map(|row| {
                let mut proba = vec![0.0; self.n_classes];
                for tree in &self.trees {
                    for (acc, p) in proba.iter_mut().zip(tree.predict_row(row)) {
                        *acc += p;
                    }
                }
                proba.iter_mut().for_each(|p| *p /= n_trees);
                proba
            })
            .collect())
    }

    pub fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<usize>> {
        Ok(self
            .predict_proba(rows)?
            .iter()
            .map(|proba| argmax(proba))
            .collect())
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_estimators(&self) -> usize {
        self.trees.len()
    }
}

/// First index of the maximum; ties resolve to the lowest class.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}
