//! Hyperparameter tuning: search space, samplers, the trial loop, and the
//! accumulated trial table with best-row selection.
//!
//! The sampling strategy is a seam ([`HyperparameterSampler`]); the shipped
//! implementation is uniform random search. One [`TrialRow`] is appended per
//! trial; rows are never mutated afterwards, only filtered by
//! [`TrialTable::best`]. The table is freshly scoped per learning problem.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ReportError, TuneError};
use crate::individual::{Individual, LearningProblem};
use crate::kb::KnowledgeBase;
use crate::learn::{LearnerConfig, LearnerFactory, QualityFunction};
use crate::metrics::score_predictions;

pub type TuneResult<T> = std::result::Result<T, TuneError>;

/// Inclusive integer bounds for one hyperparameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: u64,
    pub max: u64,
}

impl Bounds {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    fn validate(&self, parameter: &'static str) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::InvalidBounds {
                parameter,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    fn sample<R: Rng>(&self, rng: &mut R) -> u64 {
        rng.gen_range(self.min..=self.max)
    }
}

/// The hyperparameter search space for concept learners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSpace {
    pub max_runtime_secs: Bounds,
    pub max_concepts_tested: Bounds,
    pub iter_bound: Bounds,
    pub quality_funcs: Vec<QualityFunction>,
}

impl Default for SearchSpace {
    fn default() -> Self {
        Self {
            max_runtime_secs: Bounds::new(1, 60),
            max_concepts_tested: Bounds::new(100, 10_000),
            iter_bound: Bounds::new(10, 1_000),
            quality_funcs: vec![QualityFunction::F1, QualityFunction::Accuracy],
        }
    }
}

impl SearchSpace {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.max_runtime_secs.validate("max_runtime_secs")?;
        self.max_concepts_tested.validate("max_concepts_tested")?;
        self.iter_bound.validate("iter_bound")?;
        if self.quality_funcs.is_empty() {
            return Err(ConfigError::NoQualityFuncs);
        }
        Ok(())
    }
}

/// Draws one learner configuration per trial from the search space.
pub trait HyperparameterSampler {
    fn sample(&mut self, space: &SearchSpace) -> LearnerConfig;
}

/// Uniform random search over the space.
pub struct RandomSampler {
    rng: StdRng,
}

impl RandomSampler {
    /// Seeded for reproducible trial sequences; unseeded draws from entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl HyperparameterSampler for RandomSampler {
    fn sample(&mut self, space: &SearchSpace) -> LearnerConfig {
        LearnerConfig {
            max_runtime_secs: space.max_runtime_secs.sample(&mut self.rng),
            max_concepts_tested: space.max_concepts_tested.sample(&mut self.rng) as usize,
            iter_bound: space.iter_bound.sample(&mut self.rng) as usize,
            quality: *space
                .quality_funcs
                .choose(&mut self.rng)
                .expect("validated search space has at least one quality function"),
        }
    }
}

/// One hyperparameter trial's configuration and validation metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialRow {
    pub problem: String,
    pub config: LearnerConfig,
    /// Training quality of the trial's best hypothesis.
    pub quality_score: f64,
    pub validation_f1: f64,
    pub validation_accuracy: f64,
}

/// Append-only accumulator of trial results.
#[derive(Debug, Default)]
pub struct TrialTable {
    rows: Vec<TrialRow>,
}

impl TrialTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: TrialRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[TrialRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Select the best trial by sequential narrowing: maximum validation F1,
    /// then maximum validation accuracy among the tied rows, then minimum
    /// runtime cap, then first surviving row in insertion order.
    pub fn best(&self) -> Option<&TrialRow> {
        if self.rows.is_empty() {
            return None;
        }
        let mut survivors: Vec<&TrialRow> = self.rows.iter().collect();

        narrow(&mut survivors, |r| r.validation_f1, Ordering::Greater);
        narrow(&mut survivors, |r| r.validation_accuracy, Ordering::Greater);
        narrow(
            &mut survivors,
            |r| r.config.max_runtime_secs as f64,
            Ordering::Less,
        );
        survivors.into_iter().next()
    }

    /// Write the table as a CSV artifact.
    pub fn to_csv(&self, path: &Path) -> Result<(), ReportError> {
        let mut out = String::from(
            "lp,max_runtime,max_num_of_concepts_tested,iter_bound,quality_func,\
             quality_score,validation_f1_score,validation_accuracy\n",
        );
        for row in &self.rows {
            let c = &row.config;
            out.push_str(&format!(
                "{},{},{},{},{},{:.6},{:.6},{:.6}\n",
                row.problem,
                c.max_runtime_secs,
                c.max_concepts_tested,
                c.iter_bound,
                c.quality,
                row.quality_score,
                row.validation_f1,
                row.validation_accuracy,
            ));
        }
        let mut file = std::fs::File::create(path).map_err(|source| ReportError::Write {
            path: path.display().to_string(),
            source,
        })?;
        file.write_all(out.as_bytes()).map_err(|source| ReportError::Write {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Keep only the survivors whose keyed value is the extreme in `direction`.
fn narrow(survivors: &mut Vec<&TrialRow>, key: impl Fn(&TrialRow) -> f64, direction: Ordering) {
    let extreme = survivors
        .iter()
        .map(|r| key(r))
        .fold(None::<f64>, |acc, v| match acc {
            None => Some(v),
            Some(best) => Some(if v.partial_cmp(&best) == Some(direction) {
                v
            } else {
                best
            }),
        });
    if let Some(extreme) = extreme {
        survivors.retain(|r| key(r) == extreme);
    }
}

/// Runs the trial budget for one learning problem against the reduced
/// knowledge base, scoring each sampled configuration on the validation
/// split.
pub struct Tuner<'a> {
    pub kb: &'a KnowledgeBase,
    pub train: &'a LearningProblem,
    pub validation_pos: &'a [Individual],
    pub validation_neg: &'a [Individual],
}

impl Tuner<'_> {
    pub fn run(
        &self,
        problem: &str,
        factory: &dyn LearnerFactory,
        sampler: &mut dyn HyperparameterSampler,
        space: &SearchSpace,
        trials: usize,
        table: &mut TrialTable,
    ) -> TuneResult<()> {
        let val_pos: BTreeSet<Individual> = self.validation_pos.iter().cloned().collect();
        let val_neg: BTreeSet<Individual> = self.validation_neg.iter().cloned().collect();
        let mut val_all: Vec<Individual> = self.validation_pos.to_vec();
        val_all.extend_from_slice(self.validation_neg);

        for trial in 0..trials {
            let config = sampler.sample(space);
            let mut learner = factory.build(&config);
            learner.fit(self.kb, self.train)?;

            let row = match learner.best_hypothesis() {
                Some(hypothesis) => {
                    let predictions = hypothesis.classify(self.kb, &val_all)?;
                    let score = score_predictions(&predictions, &val_pos, &val_neg);
                    TrialRow {
                        problem: problem.to_string(),
                        config,
                        quality_score: hypothesis.quality,
                        validation_f1: score.reported_f1(),
                        validation_accuracy: score.reported_accuracy(),
                    }
                }
                None => {
                    tracing::warn!(problem, trial, "trial produced no hypothesis, scoring zero");
                    TrialRow {
                        problem: problem.to_string(),
                        config,
                        quality_score: 0.0,
                        validation_f1: 0.0,
                        validation_accuracy: 0.0,
                    }
                }
            };
            tracing::debug!(
                problem,
                trial,
                f1 = row.validation_f1,
                accuracy = row.validation_accuracy,
                "trial scored"
            );
            table.push(row);
        }
        Ok(())
    }
}
