//! Seeded row splits for holdout evaluation and cross-validation.
//!
//! Both splitters work on row indices. The test share of `n` rows is
//! `ceil(n * test_size)` and the remaining rows train; both sides must be
//! non-empty.

use crate::error::LearningError;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Row indices of one train/test partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

fn partition_sizes(n_rows: usize, test_size: f64) -> Result<(usize, usize), LearningError> {
    let n_test = (n_rows as f64 * test_size).ceil() as usize;
    let n_train = n_rows.saturating_sub(n_test);

    if n_test == 0 || n_train == 0 {
        return Err(LearningError::InvalidData(format!(
            "cannot split {n_rows} rows with test_size {test_size}: \
             both train and test sets need at least one row"
        )));
    }
    Ok((n_train, n_test))
}

fn shuffled_split(rng: &mut StdRng, n_rows: usize, n_test: usize) -> Split {
    let mut indices: Vec<usize> = (0..n_rows).collect();
    indices.shuffle(rng);
    let train = indices.split_off(n_test);
    Split {
        train,
        test: indices,
    }
}

/// Shuffle `n_rows` indices with `seed` and hold out a `test_size` share.
///
/// The same seed always yields the same partition.
pub fn train_test_split(n_rows: usize, test_size: f64, seed: u64) -> Result<Split, LearningError> {
    let (_, n_test) = partition_sizes(n_rows, test_size)?;
    let mut rng = StdRng::seed_from_u64(seed);
    Ok(shuffled_split(&mut rng, n_rows, n_test))
}

/// Repeated random train/test partitions for cross-validation.
///
/// Rounds are drawn from a single seeded generator, so they are
/// independent of each other but reproducible as a sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShuffleSplit {
    n_splits: u32,
    test_size: f64,
    seed: u64,
}

impl ShuffleSplit {
    pub fn new(n_splits: u32, test_size: f64, seed: u64) -> Self {
        Self {
            n_splits,
            test_size,
            seed,
        }
    }

    pub fn n_splits(&self) -> u32 {
        self.n_splits
    }

    /// All partitions of `n_rows` rows.
    pub fn split(&self, n_rows: usize) -> Result<Vec<Split>, LearningError> {
        let (_, n_test) = partition_sizes(n_rows, self.test_size)?;
        let mut rng = StdRng::seed_from_u64(self.seed);
        Ok((0..self.n_splits)
            .map(|_| shuffled_split(&mut rng, n_rows, n_test))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn assert_partition(split: &Split, n_rows: usize) {
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..n_rows).collect::<Vec<_>>());
    }

    #[test]
    fn test_train_test_split_sizes() {
        let split = train_test_split(10, 0.2, 10).unwrap();
        assert_eq!(split.test.len(), 2);
        assert_eq!(split.train.len(), 8);
        assert_partition(&split, 10);

        // 0.2 * 11 rounds up
        let split = train_test_split(11, 0.2, 10).unwrap();
        assert_eq!(split.test.len(), 3);
    }

    #[test]
    fn test_train_test_split_is_seeded() {
        assert_eq!(
            train_test_split(50, 0.2, 10).unwrap(),
            train_test_split(50, 0.2, 10).unwrap()
        );
        assert_ne!(
            train_test_split(50, 0.2, 10).unwrap(),
            train_test_split(50, 0.2, 11).unwrap()
        );
    }

    #[test]
    fn test_too_few_rows() {
        assert!(matches!(
            train_test_split(1, 0.2, 0),
            Err(LearningError::InvalidData(_))
        ));
        assert!(train_test_split(0, 0.2, 0).is_err());
        assert!(train_test_split(2, 0.2, 0).is_ok());
    }

    #[test]
    fn test_shuffle_split_rounds() {
        let splitter = ShuffleSplit::new(5, 0.2, 0);
        let splits = splitter.split(40).unwrap();

        assert_eq!(splits.len(), 5);
        for split in &splits {
            assert_eq!(split.test.len(), 8);
            assert_partition(split, 40);
        }

        let distinct: HashSet<Vec<usize>> = splits.iter().map(|s| s.test.clone()).collect();
        assert!(distinct.len() > 1);
        assert_eq!(splits, splitter.split(40).unwrap());
    }
}
