//! CART decision tree over dense `f64` feature rows.
//!
//! The tree is generic over a [`Criterion`], which supplies the running
//! statistics used during the split sweep and the value stored at each leaf.

use crate::utils::error::{ForecastError, Result};
use rand::seq::index::sample;
use rand::Rng;

/// Running statistics for a split criterion.
pub trait Criterion {
    type Target: Copy;
    type Stats: Clone;

    fn empty(&self) -> Self::Stats;
    fn add(&self, stats: &mut Self::Stats, y: Self::Target);
    fn remove(&self, stats: &mut Self::Stats, y: Self::Target);
    fn count(&self, stats: &Self::Stats) -> usize;
    /// Per-sample impurity of the samples in `stats`.
    fn impurity(&self, stats: &Self::Stats) -> f64;
    fn leaf_value(&self, stats: &Self::Stats) -> Vec<f64>;
}

/// Variance reduction for regression targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredError;

#[derive(Debug, Clone, Default)]
pub struct MomentStats {
    n: usize,
    sum: f64,
    sum_sq: f64,
}

impl Criterion for SquaredError {
    type Target = f64;
    type Stats = MomentStats;

    fn empty(&self) -> MomentStats {
        MomentStats::default()
    }

    fn add(&self, stats: &mut MomentStats, y: f64) {
        stats.n += 1;
        stats.sum += y;
        stats.sum_sq += y * y;
    }

    fn remove(&self, stats: &mut MomentStats, y: f64) {
        stats.n -= 1;
        stats.sum -= y;
        stats.sum_sq -= y * y;
    }

    fn count(&self, stats: &MomentStats) -> usize {
        stats.n
    }

    fn impurity(&self, stats: &MomentStats) -> f64 {
        if stats.n == 0 {
            return 0.0;
        }
        let n = stats.n as f64;
        let mean = stats.sum / n;
        (stats.sum_sq / n - mean * mean).max(0.0)
    }

    fn leaf_value(&self, stats: &MomentStats) -> Vec<f64> {
        if stats.n == 0 {
            return vec![0.0];
        }
        vec![stats.sum / stats.n as f64]
    }
}

/// Gini impurity for class indices in `0..n_classes`.
#[derive(Debug, Clone, Copy)]
pub struct Gini {
    pub n_classes: usize,
}

#[derive(Debug, Clone)]
pub struct ClassCounts {
    n: usize,
    counts: Vec<usize>,
}

impl Criterion for Gini {
    type Target = usize;
    type Stats = ClassCounts;

    fn empty(&self) -> ClassCounts {
        ClassCounts {
            n: 0,
            counts: vec![0; self.n_classes],
        }
    }

    fn add(&self, stats: &mut ClassCounts, y: usize) {
        stats.n += 1;
        stats.counts[y] += 1;
    }

    fn remove(&self, stats: &mut ClassCounts, y: usize) {
        stats.n -= 1;
        stats.counts[y] -= 1;
    }

    fn count(&self, stats: &ClassCounts) -> usize {
        stats.n
    }

    fn impurity(&self, stats: &ClassCounts) -> f64 {
        if stats.n == 0 {
            return 0.0;
        }
        let n = stats.n as f64;
        let sum_sq: f64 = stats
            .counts
            .iter()
            .map(|&c| {
                let p = c as f64 / n;
                p * p
            })
            .sum();
        1.0 - sum_sq
    }

    fn leaf_value(&self, stats: &ClassCounts) -> Vec<f64> {
        if stats.n == 0 {
            return vec![0.0; self.n_classes];
        }
        let n = stats.n as f64;
        stats.counts.iter().map(|&c| c as f64 / n).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Number of features drawn at each node; `None` means all of them.
    pub max_features: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    n_features: usize,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    score: f64,
}

struct Builder<'a, C: Criterion, R: Rng> {
    criterion: &'a C,
    params: &'a TreeParams,
    rows: &'a [Vec<f64>],
    targets: &'a [C::Target],
    n_features: usize,
    rng: &'a mut R,
    nodes: Vec<Node>,
}

impl<C: Criterion, R: Rng> Builder<'_, C, R> {
    fn stats_for(&self, samples: &[usize]) -> C::Stats {
        let mut stats = self.criterion.empty();
        for &i in samples {
            self.criterion.add(&mut stats, self.targets[i]);
        }
        stats
    }

    /// Feature visiting order plus how many non-constant features to evaluate.
    fn candidate_features(&mut self) -> (Vec<usize>, usize) {
        match self.params.max_features {
            Some(k) if k < self.n_features => (
                sample(&mut *self.rng, self.n_features, self.n_features).into_vec(),
                k.max(1),
            ),
            _ => ((0..self.n_features).collect(), self.n_features),
        }
    }

    fn best_split(&mut self, samples: &mut [usize], parent: &C::Stats) -> Option<BestSplit> {
        let n = samples.len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        let mut best: Option<BestSplit> = None;
        let (order, limit) = self.candidate_features();
        let mut visited = 0;

        for feature in order {
            if visited >= limit {
                break;
            }
            let rows = self.rows;
            samples.sort_by(|&a, &b| rows[a][feature].total_cmp(&rows[b][feature]));

            // constant features do not count towards the draw
            if rows[samples[0]][feature] >= rows[samples[n - 1]][feature] {
                continue;
            }
            visited += 1;

            let mut left = self.criterion.empty();
            let mut right = parent.clone();

            for pos in 0..n - 1 {
                let y = self.targets[samples[pos]];
                self.criterion.add(&mut left, y);
                self.criterion.remove(&mut right, y);

                let current = rows[samples[pos]][feature];
                let next = rows[samples[pos + 1]][feature];
                if current >= next {
                    continue;
                }

                let n_left = self.criterion.count(&left);
                let n_right = self.criterion.count(&right);
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let score = self.criterion.impurity(&left) * n_left as f64
                    + self.criterion.impurity(&right) * n_right as f64;

                // ties keep the first candidate; a split need not lower impurity
                if best.as_ref().map_or(true, |b| score < b.score) {
                    let mut threshold = current + (next - current) / 2.0;
                    // midpoint can round up to `next` for adjacent floats
                    if threshold >= next {
                        threshold = current;
                    }
                    best = Some(BestSplit {
                        feature,
                        threshold,
                        score,
                    });
                }
            }
        }

        best
    }

    fn build(&mut self, samples: &mut [usize], depth: usize) -> usize {
        let stats = self.stats_for(samples);
        let n = samples.len();
        let at_max_depth = self.params.max_depth.is_some_and(|d| depth >= d);

        let split = if n < self.params.min_samples_split.max(2)
            || at_max_depth
            || self.criterion.impurity(&stats) <= f64::EPSILON
        {
            None
        } else {
            self.best_split(samples, &stats)
        };

        let Some(split) = split else {
            self.nodes.push(Node::Leaf {
                value: self.criterion.leaf_value(&stats),
            });
            return self.nodes.len() - 1;
        };

        let rows = self.rows;
        let feature = split.feature;
        let threshold = split.threshold;
        samples.sort_by(|&a, &b| rows[a][feature].total_cmp(&rows[b][feature]));
        let mid = samples.partition_point(|&i| rows[i][feature] <= threshold);

        let index = self.nodes.len();
        self.nodes.push(Node::Leaf { value: Vec::new() });

        let (left_samples, right_samples) = samples.split_at_mut(mid);
        let left = self.build(left_samples, depth + 1);
        let right = self.build(right_samples, depth + 1);

        self.nodes[index] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        index
    }
}

impl DecisionTree {
    /// 以給定樣本索引建樹；索引可重複 (bootstrap)
    pub fn fit<C: Criterion, R: Rng>(
        criterion: &C,
        params: &TreeParams,
        rows: &[Vec<f64>],
        targets: &[C::Target],
        samples: &[usize],
        rng: &mut R,
    ) -> Result<Self> {
        let n_features = validate_rows(rows)?;
        if rows.len() != targets.len() {
            return Err(ForecastError::TrainingError {
                message: format!(
                    "feature rows ({}) and targets ({}) differ in length",
                    rows.len(),
                    targets.len()
                ),
            });
        }
        if samples.is_empty() {
            return Err(ForecastError::TrainingError {
                message: "cannot fit a tree on zero samples".to_string(),
            });
        }
        if let Some(&bad) = samples.iter().find(|&&i| i >= rows.len()) {
            return Err(ForecastError::TrainingError {
                message: format!("sample index {} out of bounds", bad),
            });
        }

        let mut working = samples.to_vec();
        let mut builder = Builder {
            criterion,
            params,
            rows,
            targets,
            n_features,
            rng,
            nodes: Vec::new(),
        };
        builder.build(&mut working, 0);

        Ok(Self {
            nodes: builder.nodes,
            n_features,
        })
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], index: usize) -> usize {
            match &nodes[index] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Leaf value for one row: `[mean]` for regression, class probabilities otherwise.
    pub fn predict_row(&self, row: &[f64]) -> &[f64] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// Returns the shared row width, rejecting empty, ragged or non-finite input.
pub(crate) fn validate_rows(rows: &[Vec<f64>]) -> Result<usize> {
    let Some(first) = rows.first() else {
        return Err(ForecastError::TrainingError {
            message: "no feature rows supplied".to_string(),
        });
    };
    let width = first.len();
    if width == 0 {
        return Err(ForecastError::TrainingError {
            message: "feature rows have no columns".to_string(),
        });
    }
    for (i, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(ForecastError::TrainingError {
                message: format!("row {} has {} features, expected {}", i, row.len(), width),
            });
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::TrainingError {
                message: format!("row {} contains a non-finite value", i),
            });
        }
    }
    Ok(width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn all(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn test_regression_tree_fits_step_function() {
        let rows: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = (0..10).map(|i| if i < 5 { 1.0 } else { 9.0 }).collect();
        let mut rng = StdRng::seed_from_u64(7);

        let tree = DecisionTree::fit(
            &SquaredError,
            &TreeParams::default(),
            &rows,
            &targets,
            &all(10),
            &mut rng,
        )
        .unwrap();

        assert_eq!(tree.predict_row(&[2.0]), &[1.0]);
        assert_eq!(tree.predict_row(&[7.0]), &[9.0]);
        // one split, two leaves
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn test_classification_tree_returns_probabilities() {
        let rows = vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]];
        let targets = vec![0usize, 0, 1, 1];
        let mut rng = StdRng::seed_from_u64(1);

        let tree = DecisionTree::fit(
            &Gini { n_classes: 2 },
            &TreeParams::default(),
            &rows,
            &targets,
            &all(4),
            &mut rng,
        )
        .unwrap();

        assert_eq!(tree.predict_row(&[0.5]), &[1.0, 0.0]);
        assert_eq!(tree.predict_row(&[2.5]), &[0.0, 1.0]);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let rows: Vec<Vec<f64>> = (0..32).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = (0..32).map(|i| (i * i) as f64).collect();
        let params = TreeParams {
            max_depth: Some(2),
            ..TreeParams::default()
        };
        let mut rng = StdRng::seed_from_u64(3);

        let tree =
            DecisionTree::fit(&SquaredError, &params, &rows, &targets, &all(32), &mut rng).unwrap();

        assert!(tree.depth() <= 2);
        assert!(tree.node_count() <= 7);
    }

    #[test]
    fn test_min_samples_leaf_is_respected() {
        let rows: Vec<Vec<f64>> = (0..6).map(|i| vec![i as f64]).collect();
        let targets = vec![0.0, 0.0, 0.0, 0.0, 0.0, 100.0];
        let params = TreeParams {
            min_samples_leaf: 3,
            ..TreeParams::default()
        };
        let mut rng = StdRng::seed_from_u64(3);

        let tree =
            DecisionTree::fit(&SquaredError, &params, &rows, &targets, &all(6), &mut rng).unwrap();

        // the outlier cannot be isolated, so it is averaged with two neighbours
        let right = tree.predict_row(&[5.0])[0];
        assert!((right - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_xor_grows_past_zero_gain_root() {
        let rows = vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]];
        let targets = vec![0usize, 1, 1, 0];
        let mut rng = StdRng::seed_from_u64(11);

        let tree = DecisionTree::fit(
            &Gini { n_classes: 2 },
            &TreeParams::default(),
            &rows,
            &targets,
            &all(4),
            &mut rng,
        )
        .unwrap();

        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.node_count(), 7);
        for (row, &class) in rows.iter().zip(&targets) {
            let proba = tree.predict_row(row);
            assert_eq!(proba[class], 1.0, "row {:?}", row);
        }
    }

    #[test]
    fn test_min_samples_split_stops_small_nodes() {
        let rows = vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]];
        let targets = vec![0usize, 0, 1, 1];
        let params = TreeParams {
            min_samples_split: 5,
            ..TreeParams::default()
        };
        let mut rng = StdRng::seed_from_u64(1);

        let tree = DecisionTree::fit(
            &Gini { n_classes: 2 },
            &params,
            &rows,
            &targets,
            &all(4),
            &mut rng,
        )
        .unwrap();

        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict_row(&[0.0]), &[0.5, 0.5]);
    }

    #[test]
    fn test_constant_feature_yields_single_leaf() {
        let rows = vec![vec![1.0]; 5];
        let targets = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let mut rng = StdRng::seed_from_u64(3);

        let tree = DecisionTree::fit(
            &SquaredError,
            &TreeParams::default(),
            &rows,
            &targets,
            &all(5),
            &mut rng,
        )
        .unwrap();

        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict_row(&[1.0]), &[3.0]);
    }

    #[test]
    fn test_fit_rejects_ragged_rows() {
        let rows = vec![vec![1.0, 2.0], vec![1.0]];
        let targets = vec![1.0, 2.0];
        let mut rng = StdRng::seed_from_u64(3);

        let result = DecisionTree::fit(
            &SquaredError,
            &TreeParams::default(),
            &rows,
            &targets,
            &all(2),
            &mut rng,
        );
        assert!(matches!(result, Err(ForecastError::TrainingError { .. })));
    }
}
