//! Dataset splitter: shuffled 60/20/20 train/validation/test partitions.
//!
//! Each polarity is shuffled and cut independently at floor(0.6 n) and
//! floor(0.8 n). Splits are computed once per learning problem and reused by
//! both feature selection and final evaluation. Reproducibility depends
//! entirely on the RNG the caller passes in.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::individual::{Individual, LearningProblem};

/// Train/validation/test partition of one polarity's example set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleSplit {
    pub train: Vec<Individual>,
    pub validation: Vec<Individual>,
    pub test: Vec<Individual>,
}

impl ExampleSplit {
    /// Total number of examples across the three partitions.
    pub fn len(&self) -> usize {
        self.train.len() + self.validation.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Both polarities of a learning problem, split for one pipeline run.
#[derive(Debug, Clone)]
pub struct ProblemSplit {
    pub positive: ExampleSplit,
    pub negative: ExampleSplit,
}

impl ProblemSplit {
    /// The training learning problem (positive/negative train partitions).
    pub fn train_lp(&self) -> LearningProblem {
        LearningProblem::new(self.positive.train.clone(), self.negative.train.clone())
    }

    /// The full test individual set: positive ∪ negative test partitions.
    pub fn test_individuals(&self) -> Vec<Individual> {
        let mut all = self.positive.test.clone();
        all.extend(self.negative.test.clone());
        all
    }
}

/// Shuffle one example set and cut it at floor(0.6 n) and floor(0.8 n).
///
/// Sets of size 0, 1 or 2 degrade to empty validation/test partitions
/// without error.
pub fn split_examples<R: Rng>(rng: &mut R, examples: Vec<Individual>) -> ExampleSplit {
    let mut examples = examples;
    examples.shuffle(rng);

    let n = examples.len();
    let train_end = n * 6 / 10;
    let val_end = n * 8 / 10;

    let test = examples.split_off(val_end);
    let validation = examples.split_off(train_end);
    ExampleSplit {
        train: examples,
        validation,
        test,
    }
}

/// Split both polarities of a learning problem, shuffling each independently.
pub fn split_problem<R: Rng>(
    rng: &mut R,
    positive: Vec<Individual>,
    negative: Vec<Individual>,
) -> ProblemSplit {
    ProblemSplit {
        positive: split_examples(rng, positive),
        negative: split_examples(rng, negative),
    }
}
