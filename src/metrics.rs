//! Prediction scoring: confusion tallies and per-class F1/accuracy pairs.
//!
//! Scores come in two-element arrays indexed by class polarity: index 0 is
//! the negative class, index 1 the positive class. The pipeline reports
//! index 1 everywhere. "Per-class accuracy" is the within-class hit rate
//! (correct predictions for that class over the class size).

use std::collections::BTreeSet;

use crate::individual::Individual;

/// Binary confusion tally over a labeled individual set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Confusion {
    pub true_pos: usize,
    pub false_pos: usize,
    pub true_neg: usize,
    pub false_neg: usize,
}

impl Confusion {
    /// Tally `(predicted, actual)` label pairs.
    pub fn tally(pairs: impl IntoIterator<Item = (bool, bool)>) -> Self {
        let mut c = Confusion::default();
        for (predicted, actual) in pairs {
            match (predicted, actual) {
                (true, true) => c.true_pos += 1,
                (true, false) => c.false_pos += 1,
                (false, false) => c.true_neg += 1,
                (false, true) => c.false_neg += 1,
            }
        }
        c
    }

    pub fn total(&self) -> usize {
        self.true_pos + self.false_pos + self.true_neg + self.false_neg
    }

    /// Overall accuracy: correct predictions over all predictions.
    /// Zero on an empty tally.
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.true_pos + self.true_neg) as f64 / total as f64
    }

    /// F1 of the positive class. Zero when the class has no support and no
    /// predictions.
    pub fn f1(&self) -> f64 {
        f1_from(self.true_pos, self.false_pos, self.false_neg)
    }

    /// Per-class F1 pair: `[negative, positive]`.
    pub fn f1_pair(&self) -> [f64; 2] {
        [
            // Negative class scored with roles swapped.
            f1_from(self.true_neg, self.false_neg, self.false_pos),
            self.f1(),
        ]
    }

    /// Per-class accuracy pair: `[negative, positive]`, each the hit rate
    /// within its class. Empty classes score zero.
    pub fn accuracy_pair(&self) -> [f64; 2] {
        [
            rate(self.true_neg, self.true_neg + self.false_pos),
            rate(self.true_pos, self.true_pos + self.false_neg),
        ]
    }
}

fn f1_from(tp: usize, fp: usize, fn_: usize) -> f64 {
    let denom = 2 * tp + fp + fn_;
    if denom == 0 {
        return 0.0;
    }
    2.0 * tp as f64 / denom as f64
}

fn rate(hits: usize, total: usize) -> f64 {
    if total == 0 { 0.0 } else { hits as f64 / total as f64 }
}

/// Evaluation scores for one prediction run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    /// Per-class F1: `[negative, positive]`.
    pub f1: [f64; 2],
    /// Per-class accuracy: `[negative, positive]`.
    pub accuracy: [f64; 2],
}

impl Score {
    /// The reported F1 value (positive class).
    pub fn reported_f1(&self) -> f64 {
        self.f1[1]
    }

    /// The reported accuracy value (positive class).
    pub fn reported_accuracy(&self) -> f64 {
        self.accuracy[1]
    }
}

/// Score predicted labels against known polarity sets. Predictions for
/// individuals outside both sets are ignored.
pub fn score_predictions(
    predictions: &[(Individual, bool)],
    actual_pos: &BTreeSet<Individual>,
    actual_neg: &BTreeSet<Individual>,
) -> Score {
    let confusion = Confusion::tally(predictions.iter().filter_map(|(ind, predicted)| {
        if actual_pos.contains(ind) {
            Some((*predicted, true))
        } else if actual_neg.contains(ind) {
            Some((*predicted, false))
        } else {
            None
        }
    }));
    Score {
        f1: confusion.f1_pair(),
        accuracy: confusion.accuracy_pair(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_predictions() {
        let c = Confusion::tally([(true, true), (true, true), (false, false)]);
        assert_eq!(c.accuracy(), 1.0);
        assert_eq!(c.f1(), 1.0);
        assert_eq!(c.f1_pair(), [1.0, 1.0]);
        assert_eq!(c.accuracy_pair(), [1.0, 1.0]);
    }

    #[test]
    fn mixed_predictions() {
        // 2 TP, 1 FP, 1 TN, 1 FN.
        let c = Confusion::tally([
            (true, true),
            (true, true),
            (true, false),
            (false, false),
            (false, true),
        ]);
        assert_eq!(c.total(), 5);
        assert!((c.accuracy() - 0.6).abs() < 1e-9);
        // F1 = 2*2 / (2*2 + 1 + 1) = 4/6
        assert!((c.f1() - 2.0 / 3.0).abs() < 1e-9);
        // Positive-class accuracy = 2/3, negative = 1/2.
        assert_eq!(c.accuracy_pair(), [0.5, 2.0 / 3.0]);
    }

    #[test]
    fn empty_tally_scores_zero() {
        let c = Confusion::default();
        assert_eq!(c.accuracy(), 0.0);
        assert_eq!(c.f1(), 0.0);
        assert_eq!(c.f1_pair(), [0.0, 0.0]);
    }

    #[test]
    fn score_predictions_ignores_unknown_individuals() {
        let pos: BTreeSet<_> = [Individual::from("http://e.org#a")].into_iter().collect();
        let neg: BTreeSet<_> = [Individual::from("http://e.org#b")].into_iter().collect();
        let predictions = vec![
            (Individual::from("http://e.org#a"), true),
            (Individual::from("http://e.org#b"), false),
            (Individual::from("http://e.org#stranger"), true),
        ];
        let score = score_predictions(&predictions, &pos, &neg);
        assert_eq!(score.reported_f1(), 1.0);
        assert_eq!(score.reported_accuracy(), 1.0);
    }
}
