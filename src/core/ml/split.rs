use crate::utils::error::{ForecastError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row indices of a shuffled train/test partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl Split {
    pub fn select<T: Clone>(indices: &[usize], values: &[T]) -> Vec<T> {
        indices.iter().map(|&i| values[i].clone()).collect()
    }
}

/// 打亂 0..n 後，前 ceil(test_size * n) 筆為測試集，其餘為訓練集
pub fn train_test_split(n: usize, test_size: f64, seed: u64) -> Result<Split> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(ForecastError::TrainingError {
            message: format!("test_size must be in (0, 1), got {}", test_size),
        });
    }

    let n_test = (test_size * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(ForecastError::TrainingError {
            message: format!(
                "{} rows with test_size {} leaves an empty train or test set",
                n, test_size
            ),
        });
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok(Split {
        train,
        test: indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_split_sizes_follow_ceiling() {
        let split = train_test_split(1461, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 293);
        assert_eq!(split.train.len(), 1168);
    }

    #[test]
    fn test_split_is_a_partition() {
        let split = train_test_split(100, 0.25, 1).unwrap();
        let all: HashSet<usize> = split.train.iter().chain(&split.test).copied().collect();
        assert_eq!(all.len(), 100);
        assert!(all.iter().all(|&i| i < 100));
    }

    #[test]
    fn test_split_is_deterministic_per_seed() {
        assert_eq!(
            train_test_split(50, 0.2, 42).unwrap(),
            train_test_split(50, 0.2, 42).unwrap()
        );
        assert_ne!(
            train_test_split(50, 0.2, 42).unwrap(),
            train_test_split(50, 0.2, 43).unwrap()
        );
    }

    #[test]
    fn test_degenerate_splits_are_rejected() {
        assert!(train_test_split(10, 0.0, 42).is_err());
        assert!(train_test_split(10, 1.0, 42).is_err());
        assert!(train_test_split(1, 0.2, 42).is_err());
        assert!(train_test_split(0, 0.2, 42).is_err());
    }

    #[test]
    fn test_select_picks_rows_in_index_order() {
        let values = vec!["a", "b", "c", "d"];
        assert_eq!(Split::select(&[3, 1], &values), vec!["d", "b"]);
    }
}
