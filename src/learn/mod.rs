//! Concept-learner seam: hypotheses, hyperparameters, and the traits the
//! pipeline drives learners through.
//!
//! The pipeline never depends on a concrete learning algorithm. Feature
//! selection, tuning and final evaluation all go through [`ConceptLearner`]
//! and [`LearnerFactory`]; the crate ships a bounded refinement baseline
//! ([`refinement::RefinementLearner`]) as the default plug-in.

pub mod refinement;

use serde::{Deserialize, Serialize};

use crate::concept::ClassExpression;
use crate::error::LearnError;
use crate::individual::{Individual, LearningProblem};
use crate::kb::{KbResult, KnowledgeBase};
use crate::metrics::Confusion;

pub type LearnResult<T> = std::result::Result<T, LearnError>;

/// Quality function used to score candidate concepts during fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityFunction {
    /// F1 of the positive class.
    F1,
    /// Overall accuracy.
    Accuracy,
}

impl QualityFunction {
    pub fn compute(&self, confusion: &Confusion) -> f64 {
        match self {
            QualityFunction::F1 => confusion.f1(),
            QualityFunction::Accuracy => confusion.accuracy(),
        }
    }
}

impl std::fmt::Display for QualityFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualityFunction::F1 => write!(f, "f1"),
            QualityFunction::Accuracy => write!(f, "accuracy"),
        }
    }
}

impl std::str::FromStr for QualityFunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "f1" => Ok(QualityFunction::F1),
            "accuracy" => Ok(QualityFunction::Accuracy),
            other => Err(format!("unknown quality function: {other}")),
        }
    }
}

/// The four tuned learner hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearnerConfig {
    /// Wall-clock budget for one fit, in seconds.
    pub max_runtime_secs: u64,
    /// Upper bound on scored candidate concepts.
    pub max_concepts_tested: usize,
    /// Upper bound on refinement iterations.
    pub iter_bound: usize,
    /// Quality function for candidate scoring.
    pub quality: QualityFunction,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            max_runtime_secs: 10,
            max_concepts_tested: 10_000,
            iter_bound: 100,
            quality: QualityFunction::F1,
        }
    }
}

impl std::fmt::Display for LearnerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "max_runtime={}s max_concepts_tested={} iter_bound={} quality_func={}",
            self.max_runtime_secs, self.max_concepts_tested, self.iter_bound, self.quality
        )
    }
}

/// A learned concept expression with its training quality score.
#[derive(Debug, Clone, PartialEq)]
pub struct Hypothesis {
    pub expression: ClassExpression,
    pub quality: f64,
}

impl Hypothesis {
    /// Predict a label for every individual: true iff it satisfies the
    /// hypothesis expression under asserted-triple semantics.
    pub fn classify(
        &self,
        kb: &KnowledgeBase,
        individuals: &[Individual],
    ) -> KbResult<Vec<(Individual, bool)>> {
        individuals
            .iter()
            .map(|ind| Ok((ind.clone(), kb.satisfies(ind, &self.expression)?)))
            .collect()
    }
}

impl std::fmt::Display for Hypothesis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (quality {:.4})", self.expression, self.quality)
    }
}

/// A concept-learning model: fitted once against a training learning
/// problem, then queried for its ranked hypotheses.
pub trait ConceptLearner {
    /// Fit against the training learning problem.
    fn fit(&mut self, kb: &KnowledgeBase, lp: &LearningProblem) -> LearnResult<()>;

    /// The top `n` hypotheses, best first. Empty before `fit` or when the
    /// learner found nothing.
    fn best_hypotheses(&self, n: usize) -> Vec<Hypothesis>;

    /// The single best hypothesis, if any.
    fn best_hypothesis(&self) -> Option<Hypothesis> {
        self.best_hypotheses(1).into_iter().next()
    }
}

/// Constructs learners from hyperparameter configurations. The tuner builds
/// one learner per trial; the final evaluator builds one from the winning
/// trial row.
pub trait LearnerFactory {
    fn build(&self, config: &LearnerConfig) -> Box<dyn ConceptLearner>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_function_round_trips_through_strings() {
        for q in [QualityFunction::F1, QualityFunction::Accuracy] {
            let parsed: QualityFunction = q.to_string().parse().unwrap();
            assert_eq!(parsed, q);
        }
        assert!("gini".parse::<QualityFunction>().is_err());
    }

    #[test]
    fn quality_functions_disagree_on_skewed_tallies() {
        // All-negative predictions on a 1-positive / 9-negative set:
        // accuracy is high, F1 of the positive class is zero.
        let c = Confusion {
            true_pos: 0,
            false_pos: 0,
            true_neg: 9,
            false_neg: 1,
        };
        assert_eq!(QualityFunction::F1.compute(&c), 0.0);
        assert!(QualityFunction::Accuracy.compute(&c) > 0.8);
    }

    #[test]
    fn learner_config_display_names_all_hyperparameters() {
        let text = LearnerConfig::default().to_string();
        for field in ["max_runtime", "max_concepts_tested", "iter_bound", "quality_func"] {
            assert!(text.contains(field), "missing {field} in {text}");
        }
    }
}
