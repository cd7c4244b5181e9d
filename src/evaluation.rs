//! Metrics for binary churn classifiers trained on the processed outputs.
//!
//! All functions take labels and predictions as `0.0` / `1.0` values, the
//! encoding written to `y_train.csv` and `y_test.csv`.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

fn check_lengths(y_true: &[f64], other: &[f64]) -> Result<()> {
    if y_true.len() != other.len() {
        return Err(PipelineError::InvalidArgument(format!(
            "length mismatch: {} labels vs {} predictions",
            y_true.len(),
            other.len()
        )));
    }
    Ok(())
}

fn as_class(value: f64) -> Result<bool> {
    if value == 1.0 {
        Ok(true)
    } else if value == 0.0 {
        Ok(false)
    } else {
        Err(PipelineError::InvalidArgument(format!(
            "binary value expected, got {}",
            value
        )))
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Counts of a binary confusion matrix.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tn: usize,
    pub fp: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
    pub tp: usize,
}

impl ConfusionMatrix {
    /// Tally true against predicted labels.
    ///
    /// # Errors
    /// [`PipelineError::InvalidArgument`] on a length mismatch or a value
    /// other than `0` or `1`.
    pub fn from_labels(y_true: &[f64], y_pred: &[f64]) -> Result<Self> {
        check_lengths(y_true, y_pred)?;
        let mut cm = Self::default();
        for (&t, &p) in y_true.iter().zip(y_pred) {
            match (as_class(t)?, as_class(p)?) {
                (false, false) => cm.tn += 1,
                (false, true) => cm.fp += 1,
                (true, false) => cm.fn_ += 1,
                (true, true) => cm.tp += 1,
            }
        }
        Ok(cm)
    }

    pub fn total(&self) -> usize {
        self.tn + self.fp + self.fn_ + self.tp
    }

    /// Rows are true labels, columns predictions: `[[tn, fp], [fn, tp]]`.
    pub fn as_rows(&self) -> [[usize; 2]; 2] {
        [[self.tn, self.fp], [self.fn_, self.tp]]
    }
}

/// Standard scores for the positive (churn) class. Zero division yields 0.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl ClassificationMetrics {
    pub fn from_confusion(cm: &ConfusionMatrix) -> Self {
        let precision = ratio(cm.tp, cm.tp + cm.fp);
        let recall = ratio(cm.tp, cm.tp + cm.fn_);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        Self {
            accuracy: ratio(cm.tp + cm.tn, cm.total()),
            precision,
            recall,
            f1,
        }
    }

    pub fn from_labels(y_true: &[f64], y_pred: &[f64]) -> Result<Self> {
        Ok(Self::from_confusion(&ConfusionMatrix::from_labels(
            y_true, y_pred,
        )?))
    }
}

/// Area under the ROC curve of `scores` against binary `y_true`.
///
/// Thresholds are the distinct scores in descending order; tied scores move
/// the curve diagonally. The area is integrated with the trapezoid rule.
///
/// # Errors
/// [`PipelineError::InvalidArgument`] on a length mismatch, a non-binary
/// label, a non-finite score, or when only one class is present.
pub fn roc_auc(y_true: &[f64], scores: &[f64]) -> Result<f64> {
    check_lengths(y_true, scores)?;
    let mut pairs = Vec::with_capacity(y_true.len());
    for (&t, &s) in y_true.iter().zip(scores) {
        if !s.is_finite() {
            return Err(PipelineError::InvalidArgument(format!(
                "score must be finite, got {}",
                s
            )));
        }
        pairs.push((s, as_class(t)?));
    }

    let positives = pairs.iter().filter(|(_, p)| *p).count();
    let negatives = pairs.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(PipelineError::InvalidArgument(
            "ROC AUC needs both classes in y_true".to_string(),
        ));
    }

    pairs.sort_by(|a, b| b.0.total_cmp(&a.0));

    let (mut tp, mut fp) = (0usize, 0usize);
    let (mut prev_tpr, mut prev_fpr) = (0.0, 0.0);
    let mut area = 0.0;
    let mut i = 0;
    while i < pairs.len() {
        let threshold = pairs[i].0;
        while i < pairs.len() && pairs[i].0 == threshold {
            if pairs[i].1 {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        let tpr = tp as f64 / positives as f64;
        let fpr = fp as f64 / negatives as f64;
        area += (fpr - prev_fpr) * (tpr + prev_tpr) / 2.0;
        prev_tpr = tpr;
        prev_fpr = fpr;
    }
    Ok(area)
}

/// Churn-retention view of a classifier's test-set predictions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BusinessMetrics {
    pub total_customers: usize,
    pub actual_churners: usize,
    pub predicted_churners: usize,
    pub correctly_identified_churners: usize,
    pub missed_churners: usize,
    pub false_alarms: usize,
    /// Share of actual churners that were flagged.
    pub churn_detection_rate: f64,
    /// Share of non-churners that were flagged.
    pub false_alarm_rate: f64,
    pub precision: f64,
}

impl BusinessMetrics {
    pub fn from_confusion(cm: &ConfusionMatrix) -> Self {
        let actual = cm.tp + cm.fn_;
        Self {
            total_customers: cm.total(),
            actual_churners: actual,
            predicted_churners: cm.tp + cm.fp,
            correctly_identified_churners: cm.tp,
            missed_churners: cm.fn_,
            false_alarms: cm.fp,
            churn_detection_rate: ratio(cm.tp, actual),
            false_alarm_rate: ratio(cm.fp, cm.fp + cm.tn),
            precision: ratio(cm.tp, cm.tp + cm.fp),
        }
    }

    pub fn from_labels(y_true: &[f64], y_pred: &[f64]) -> Result<Self> {
        let metrics = Self::from_confusion(&ConfusionMatrix::from_labels(y_true, y_pred)?);
        metrics.log_summary();
        Ok(metrics)
    }

    fn log_summary(&self) {
        info!("Business Metrics:");
        info!("  Total Customers: {}", self.total_customers);
        info!("  Actual Churners: {}", self.actual_churners);
        info!("  Predicted Churners: {}", self.predicted_churners);
        info!("  Correctly Identified: {}", self.correctly_identified_churners);
        info!("  Missed Churners: {}", self.missed_churners);
        info!("  False Alarms: {}", self.false_alarms);
        info!("  Churn Detection Rate: {:.2}%", self.churn_detection_rate * 100.0);
        info!("  False Alarm Rate: {:.2}%", self.false_alarm_rate * 100.0);
        info!("  Precision: {:.2}%", self.precision * 100.0);
    }

    /// Write as pretty-printed JSON, creating parent directories.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!("Business metrics saved to {}", path.display());
        Ok(())
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const Y_TRUE: [f64; 8] = [1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
    const Y_PRED: [f64; 8] = [1.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];

    #[test]
    fn test_confusion_matrix() {
        let cm = ConfusionMatrix::from_labels(&Y_TRUE, &Y_PRED).unwrap();
        assert_eq!(cm.as_rows(), [[4, 1], [1, 2]]);
        assert_eq!(cm.total(), 8);
    }

    #[test]
    fn test_classification_metrics() {
        let m = ClassificationMetrics::from_labels(&Y_TRUE, &Y_PRED).unwrap();
        assert!((m.accuracy - 0.75).abs() < 1e-12);
        assert!((m.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.recall - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.f1 - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_division_gives_zero() {
        let m = ClassificationMetrics::from_labels(&[0.0, 0.0], &[0.0, 0.0]).unwrap();
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.recall, 0.0);
        assert_eq!(m.f1, 0.0);
        assert_eq!(m.accuracy, 1.0);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            ConfusionMatrix::from_labels(&[1.0], &[1.0, 0.0]),
            Err(PipelineError::InvalidArgument(_))
        ));
        assert!(matches!(
            ConfusionMatrix::from_labels(&[2.0], &[1.0]),
            Err(PipelineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_roc_auc() {
        // perfect ranking
        let auc = roc_auc(&[0.0, 0.0, 1.0, 1.0], &[0.1, 0.2, 0.8, 0.9]).unwrap();
        assert!((auc - 1.0).abs() < 1e-12);

        // one swapped pair out of four
        let auc = roc_auc(&[0.0, 0.0, 1.0, 1.0], &[0.1, 0.4, 0.35, 0.8]).unwrap();
        assert!((auc - 0.75).abs() < 1e-12);

        // all tied scores
        let auc = roc_auc(&[0.0, 1.0, 0.0, 1.0], &[0.5; 4]).unwrap();
        assert!((auc - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_roc_auc_single_class() {
        assert!(matches!(
            roc_auc(&[1.0, 1.0], &[0.3, 0.6]),
            Err(PipelineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_business_metrics_json() {
        let metrics = BusinessMetrics::from_labels(&Y_TRUE, &Y_PRED).unwrap();
        assert_eq!(metrics.actual_churners, 3);
        assert_eq!(metrics.predicted_churners, 3);
        assert_eq!(metrics.missed_churners, 1);
        assert_eq!(metrics.false_alarms, 1);
        assert!((metrics.false_alarm_rate - 0.2).abs() < 1e-12);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics").join("business_metrics.json");
        metrics.save_json(&path).unwrap();
        let json = std::fs::read_to_string(&path).unwrap();
        assert!(json.contains("\"churn_detection_rate\""));
        let loaded = BusinessMetrics::load_json(&path).unwrap();
        assert_eq!(loaded.total_customers, 8);
        assert!((loaded.precision - metrics.precision).abs() < 1e-12);
    }
}
