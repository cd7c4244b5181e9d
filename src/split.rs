//! Stratified, seeded train/test partitioning.
//!
//! The label column is split off as the target and the identifier column is
//! dropped from the features. Rows are then partitioned so that every class
//! keeps (within rounding) its share of the full frame in both subsets.
//!
//! # Algorithm
//!
//! 1. `n_test = ceil(test_size * n)`, `n_train = n - n_test`
//! 2. per-class train counts follow the approximate mode of the multivariate
//!    hypergeometric: floor of the proportional share, with the remaining
//!    draws going to the largest fractional parts (ties by class order)
//! 3. each class's rows are permuted by a [`ChaCha8Rng`] seeded with `seed`;
//!    the first rows go to train and the rest to test
//! 4. train and test orders are permuted once more
//!
//! The same frame, fraction and seed always produce the same partition.

use crate::dataset::Frame;
use crate::error::{PipelineError, Result};
use crate::schema::{CUSTOMER_ID, TARGET_COLUMN};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

/// Default fraction of rows held out for testing.
pub const DEFAULT_TEST_SIZE: f64 = 0.2;
/// Default seed controlling the partition.
pub const DEFAULT_RANDOM_STATE: u64 = 42;

/// A stratified train/test partition.
#[derive(Clone, Debug, PartialEq)]
pub struct Split {
    pub x_train: Frame,
    pub x_test: Frame,
    /// Single-column frame holding the train labels.
    pub y_train: Frame,
    /// Single-column frame holding the test labels.
    pub y_test: Frame,
    /// Row indices of the input frame that went to train, in output order.
    pub train_rows: Vec<usize>,
    /// Row indices of the input frame that went to test, in output order.
    pub test_rows: Vec<usize>,
}

impl Split {
    /// Fraction of positive labels in train and test.
    pub fn churn_rates(&self) -> (f64, f64) {
        (positive_rate(&self.y_train), positive_rate(&self.y_test))
    }
}

fn positive_rate(labels: &Frame) -> f64 {
    let values = labels.numeric(TARGET_COLUMN).unwrap_or(&[]);
    if values.is_empty() {
        return 0.0;
    }
    let positives = values.iter().filter(|v| **v == Some(1.0)).count();
    positives as f64 / values.len() as f64
}

/// Allocate `n_draws` across classes proportionally to `class_counts`.
///
/// Floors the continuous allocation and hands the shortfall to the classes
/// with the largest fractional remainders; equal remainders go to the class
/// that comes first.
pub fn approximate_mode(class_counts: &[usize], n_draws: usize) -> Vec<usize> {
    let total: usize = class_counts.iter().sum();
    if total == 0 {
        return vec![0; class_counts.len()];
    }

    let continuous: Vec<f64> = class_counts
        .iter()
        .map(|&c| c as f64 * n_draws as f64 / total as f64)
        .collect();
    let mut floored: Vec<usize> = continuous.iter().map(|c| c.floor() as usize).collect();
    let mut need = n_draws.saturating_sub(floored.iter().sum());

    let mut order: Vec<usize> = (0..class_counts.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = continuous[a] - continuous[a].floor();
        let rb = continuous[b] - continuous[b].floor();
        rb.total_cmp(&ra).then(a.cmp(&b))
    });
    for idx in order {
        if need == 0 {
            break;
        }
        if floored[idx] < class_counts[idx] {
            floored[idx] += 1;
            need -= 1;
        }
    }
    floored
}

/// Split `frame` into stratified train and test subsets.
///
/// # Errors
/// - [`PipelineError::InvalidArgument`] if `test_size` is outside `(0, 1)`,
///   the label column has nulls or non-binary values, a class has fewer than
///   two rows, or either subset would be smaller than the number of classes
/// - [`PipelineError::Schema`] / [`PipelineError::Type`] if the label column
///   is absent or not numeric
pub fn stratified_split(frame: &Frame, test_size: f64, seed: u64) -> Result<Split> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(PipelineError::InvalidArgument(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }
    info!("Splitting data (test_size={})...", test_size);

    let labels = frame.numeric(TARGET_COLUMN)?;
    let mut classes: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
    for (row, label) in labels.iter().enumerate() {
        match label {
            Some(v) if *v == 0.0 => classes[0].push(row),
            Some(v) if *v == 1.0 => classes[1].push(row),
            Some(v) => {
                return Err(PipelineError::InvalidArgument(format!(
                    "label column '{}' must hold 0 or 1, found {} at row {}",
                    TARGET_COLUMN, v, row
                )))
            }
            None => {
                return Err(PipelineError::InvalidArgument(format!(
                    "label column '{}' has a null at row {}",
                    TARGET_COLUMN, row
                )))
            }
        }
    }
    let classes: Vec<Vec<usize>> = classes.into_iter().filter(|c| !c.is_empty()).collect();

    let n = frame.n_rows();
    let n_test = (test_size * n as f64).ceil() as usize;
    let n_train = n.saturating_sub(n_test);

    if let Some(smallest) = classes.iter().map(Vec::len).min() {
        if smallest < 2 {
            return Err(PipelineError::InvalidArgument(
                "the least populated class has only 1 member, at least 2 are needed to stratify"
                    .to_string(),
            ));
        }
    }
    if n_train < classes.len() || n_test < classes.len() || classes.is_empty() {
        return Err(PipelineError::InvalidArgument(format!(
            "cannot stratify {} rows into {} train / {} test with {} classes",
            n,
            n_train,
            n_test,
            classes.len()
        )));
    }

    let counts: Vec<usize> = classes.iter().map(Vec::len).collect();
    let train_counts = approximate_mode(&counts, n_train);

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train_rows = Vec::with_capacity(n_train);
    let mut test_rows = Vec::with_capacity(n_test);
    for (members, &n_i) in classes.iter().zip(&train_counts) {
        let mut perm = members.clone();
        perm.shuffle(&mut rng);
        train_rows.extend_from_slice(&perm[..n_i]);
        test_rows.extend_from_slice(&perm[n_i..]);
    }
    train_rows.shuffle(&mut rng);
    test_rows.shuffle(&mut rng);

    let features = frame.drop_columns(&[TARGET_COLUMN, CUSTOMER_ID]);
    let target = frame.drop_columns(
        &frame
            .names()
            .iter()
            .map(String::as_str)
            .filter(|name| *name != TARGET_COLUMN)
            .collect::<Vec<_>>(),
    );

    let split = Split {
        x_train: features.take_rows(&train_rows),
        x_test: features.take_rows(&test_rows),
        y_train: target.take_rows(&train_rows),
        y_test: target.take_rows(&test_rows),
        train_rows,
        test_rows,
    };

    let (train_rate, test_rate) = split.churn_rates();
    info!("Training set: {} samples", split.train_rows.len());
    info!("Test set: {} samples", split.test_rows.len());
    info!(
        "Churn rate - Train: {:.2}%, Test: {:.2}%",
        train_rate * 100.0,
        test_rate * 100.0
    );
    Ok(split)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;
    use std::collections::HashSet;

    fn labelled_frame(positives: usize, negatives: usize) -> Frame {
        let n = positives + negatives;
        let labels = (0..n)
            .map(|i| Some(if i < positives { 1.0 } else { 0.0 }))
            .collect();
        Frame::new(vec![
            (
                "CustomerID".to_string(),
                Column::Text((0..n).map(|i| Some(format!("C{}", i))).collect()),
            ),
            (
                "Age".to_string(),
                Column::Numeric((0..n).map(|i| Some(i as f64)).collect()),
            ),
            ("Churn".to_string(), Column::Numeric(labels)),
        ])
        .unwrap()
    }

    #[test]
    fn test_approximate_mode() {
        assert_eq!(approximate_mode(&[50, 50], 80), vec![40, 40]);
        assert_eq!(approximate_mode(&[50, 73], 98), vec![40, 58]);
        assert_eq!(approximate_mode(&[1, 1], 1), vec![1, 0]);
        assert_eq!(approximate_mode(&[], 0), Vec::<usize>::new());
    }

    #[test]
    fn test_split_sizes_and_columns() {
        let frame = labelled_frame(30, 70);
        let split = stratified_split(&frame, 0.2, 42).unwrap();

        assert_eq!(split.x_train.n_rows(), 80);
        assert_eq!(split.x_test.n_rows(), 20);
        assert_eq!(split.x_train.names(), &["Age".to_string()]);
        assert_eq!(split.y_train.names(), &["Churn".to_string()]);
    }

    #[test]
    fn test_split_is_disjoint_and_complete() {
        let frame = labelled_frame(30, 70);
        let split = stratified_split(&frame, 0.25, 7).unwrap();

        let train: HashSet<_> = split.train_rows.iter().collect();
        let test: HashSet<_> = split.test_rows.iter().collect();
        assert!(train.is_disjoint(&test));
        assert_eq!(train.len() + test.len(), 100);
    }

    #[test]
    fn test_split_preserves_class_ratio() {
        let frame = labelled_frame(300, 700);
        let split = stratified_split(&frame, 0.2, 42).unwrap();
        let (train_rate, test_rate) = split.churn_rates();
        assert!((train_rate - 0.3).abs() < 1e-9);
        assert!((test_rate - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_split_is_deterministic() {
        let frame = labelled_frame(40, 60);
        let a = stratified_split(&frame, 0.2, 123).unwrap();
        let b = stratified_split(&frame, 0.2, 123).unwrap();
        assert_eq!(a, b);

        let c = stratified_split(&frame, 0.2, 124).unwrap();
        assert_ne!(a.train_rows, c.train_rows);
    }

    #[test]
    fn test_features_follow_rows() {
        let frame = labelled_frame(10, 10);
        let split = stratified_split(&frame, 0.5, 1).unwrap();
        let ages = split.x_train.numeric("Age").unwrap();
        for (age, row) in ages.iter().zip(&split.train_rows) {
            assert_eq!(*age, Some(*row as f64));
        }
    }

    #[test]
    fn test_invalid_test_size() {
        let frame = labelled_frame(10, 10);
        for bad in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            assert!(matches!(
                stratified_split(&frame, bad, 42),
                Err(PipelineError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_single_member_class_rejected() {
        let frame = labelled_frame(1, 20);
        assert!(matches!(
            stratified_split(&frame, 0.2, 42),
            Err(PipelineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_test_set_smaller_than_class_count_rejected() {
        let frame = labelled_frame(5, 5);
        // ceil(0.05 * 10) = 1 test row for 2 classes
        assert!(matches!(
            stratified_split(&frame, 0.05, 42),
            Err(PipelineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_non_binary_label_rejected() {
        let frame = labelled_frame(5, 5)
            .with_column("Churn", Column::Numeric(vec![Some(2.0); 10]))
            .unwrap();
        assert!(matches!(
            stratified_split(&frame, 0.2, 42),
            Err(PipelineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_null_label_rejected() {
        let mut labels = vec![Some(1.0); 5];
        labels.extend(vec![Some(0.0); 4]);
        labels.push(None);
        let frame = labelled_frame(5, 5)
            .with_column("Churn", Column::Numeric(labels))
            .unwrap();
        assert!(matches!(
            stratified_split(&frame, 0.2, 42),
            Err(PipelineError::InvalidArgument(_))
        ));
    }
}
