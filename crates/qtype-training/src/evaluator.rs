//! Classification metrics over a fixed label universe.
//!
//! Every metric is computed per label and then macro-averaged:
//!
//! - precision = TP / (TP + FP)
//! - recall = TP / (TP + FN)
//! - F1 = 2 * P * R / (P + R), per label, averaged afterwards (not derived
//!   from the averaged precision and recall)
//!
//! A zero denominator yields 0.0 for that label. A registered label that
//! appears in neither the true nor the predicted sequence is left out of the
//! average, so unused labels never drag the score down.

use crate::dataset::{Label, LabelSet};
use crate::error::{TrainingError, TrainingResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Macro-averaged precision, recall and F1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

/// Scores for a single label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelScores {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    /// Occurrences in the true sequence.
    pub support: usize,
    /// Occurrences in the predicted sequence.
    pub predicted: usize,
}

impl LabelScores {
    /// False when the label occurs in neither sequence.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.support > 0 || self.predicted > 0
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct LabelCounts {
    tp: usize,
    fp: usize,
    fn_: usize,
}

impl LabelCounts {
    fn is_active(&self) -> bool {
        self.tp + self.fp + self.fn_ > 0
    }

    fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    fn f1_score(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r > 0.0 { 2.0 * p * r / (p + r) } else { 0.0 }
    }

    fn scores(&self) -> LabelScores {
        LabelScores {
            precision: self.precision(),
            recall: self.recall(),
            f1_score: self.f1_score(),
            support: self.tp + self.fn_,
            predicted: self.tp + self.fp,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(num: usize, den: usize) -> f64 {
    if den > 0 { num as f64 / den as f64 } else { 0.0 }
}

/// Scores predictions against ground truth for one registered label set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluator {
    labels: LabelSet,
}

impl Evaluator {
    #[must_use]
    pub fn new(labels: LabelSet) -> Self {
        Self { labels }
    }

    #[must_use]
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn precision(&self, y_true: &[Label], y_pred: &[Label]) -> TrainingResult<f64> {
        Ok(macro_average(&self.counts(y_true, y_pred)?, LabelCounts::precision))
    }

    pub fn recall(&self, y_true: &[Label], y_pred: &[Label]) -> TrainingResult<f64> {
        Ok(macro_average(&self.counts(y_true, y_pred)?, LabelCounts::recall))
    }

    pub fn f1_score(&self, y_true: &[Label], y_pred: &[Label]) -> TrainingResult<f64> {
        Ok(macro_average(&self.counts(y_true, y_pred)?, LabelCounts::f1_score))
    }

    /// All three macro-averaged metrics from a single pass.
    pub fn evaluate(&self, y_true: &[Label], y_pred: &[Label]) -> TrainingResult<Metrics> {
        let counts = self.counts(y_true, y_pred)?;
        Ok(Metrics {
            precision: macro_average(&counts, LabelCounts::precision),
            recall: macro_average(&counts, LabelCounts::recall),
            f1_score: macro_average(&counts, LabelCounts::f1_score),
        })
    }

    /// Per-label breakdown, one entry for every registered label.
    pub fn per_label(&self, y_true: &[Label], y_pred: &[Label]) -> TrainingResult<BTreeMap<Label, LabelScores>> {
        let counts = self.counts(y_true, y_pred)?;
        Ok(self
            .labels
            .iter()
            .zip(counts.iter())
            .map(|(label, c)| (label.clone(), c.scores()))
            .collect())
    }

    fn counts(&self, y_true: &[Label], y_pred: &[Label]) -> TrainingResult<Vec<LabelCounts>> {
        if y_true.len() != y_pred.len() {
            return Err(TrainingError::Evaluation(format!(
                "label sequences differ in length: {} true vs {} predicted",
                y_true.len(),
                y_pred.len()
            )));
        }
        if y_true.is_empty() {
            return Err(TrainingError::Evaluation("label sequences must not be empty".to_string()));
        }

        let mut counts = vec![LabelCounts::default(); self.labels.len()];
        for (idx, (truth, pred)) in y_true.iter().zip(y_pred).enumerate() {
            let t = self.position(truth, idx, "true")?;
            let p = self.position(pred, idx, "predicted")?;
            if t == p {
                counts[t].tp += 1;
            } else {
                counts[t].fn_ += 1;
                counts[p].fp += 1;
            }
        }
        Ok(counts)
    }

    fn position(&self, label: &Label, idx: usize, side: &str) -> TrainingResult<usize> {
        self.labels.index_of(label).ok_or_else(|| {
            TrainingError::Evaluation(format!("{side} label '{label}' at position {idx} is not registered"))
        })
    }
}

#[allow(clippy::cast_precision_loss)]
fn macro_average(counts: &[LabelCounts], metric: fn(&LabelCounts) -> f64) -> f64 {
    let active: Vec<f64> = counts.iter().filter(|c| c.is_active()).map(metric).collect();
    if active.is_empty() {
        return 0.0;
    }
    active.iter().sum::<f64>() / active.len() as f64
}
