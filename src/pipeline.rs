//! Pipeline orchestration: split → feature selection → reduction → tuning →
//! final fit → evaluation → report, sequentially per learning problem.
//!
//! Each learning problem gets a freshly scoped trial table and its own
//! reduced-ontology artifact. A failure in one problem aborts the run; only
//! the degraded policies documented on the knowledge base (property
//! enumeration) and feature selector (zero hypotheses) continue.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::PipelineConfig;
use crate::error::{AutoClResult, LearnError, TuneError};
use crate::individual::Individual;
use crate::kb::reduce::reduce_to_features;
use crate::kb::KnowledgeBase;
use crate::learn::{LearnerConfig, LearnerFactory};
use crate::metrics::score_predictions;
use crate::report::RunReporter;
use crate::select::select_features;
use crate::settings::{ProblemSpec, SettingsDoc};
use crate::split::split_problem;
use crate::tune::{HyperparameterSampler, TrialTable, Tuner};

/// Result of one learning problem's full pipeline pass.
#[derive(Debug, Clone)]
pub struct ProblemOutcome {
    /// Target-concept name from the settings file.
    pub problem: String,
    /// Rendered final concept.
    pub concept: String,
    /// Training quality of the final hypothesis.
    pub quality: f64,
    /// Positive-class F1 on the test split.
    pub test_f1: f64,
    /// Positive-class accuracy on the test split.
    pub test_accuracy: f64,
    /// Property names retained by feature selection.
    pub selected_features: BTreeSet<String>,
    /// Winning hyperparameter configuration.
    pub best_config: LearnerConfig,
    /// Trials run for this problem.
    pub trials: usize,
    /// Wall-clock time for the whole problem.
    pub elapsed: Duration,
    /// Wall-clock time for the final fit-and-evaluate stage.
    pub final_stage_elapsed: Duration,
}

/// The experiment pipeline for one dataset.
pub struct Pipeline<'a> {
    settings: &'a SettingsDoc,
    config: &'a PipelineConfig,
    reporter: RunReporter,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline; creates the output directory and report file path.
    pub fn new(
        settings: &'a SettingsDoc,
        config: &'a PipelineConfig,
        dataset: &str,
    ) -> AutoClResult<Self> {
        config.validate()?;
        let reporter = RunReporter::new(&config.output_dir, dataset)?;
        Ok(Self {
            settings,
            config,
            reporter,
        })
    }

    pub fn reporter(&self) -> &RunReporter {
        &self.reporter
    }

    /// Run every learning problem in the settings document, in order.
    pub fn run(
        &self,
        data_path: &Path,
        factory: &dyn LearnerFactory,
        sampler: &mut dyn HyperparameterSampler,
    ) -> AutoClResult<Vec<ProblemOutcome>> {
        let kb = KnowledgeBase::open(data_path)?;
        tracing::info!(
            ontology = %data_path.display(),
            triples = kb.triple_count(),
            problems = self.settings.problems.len(),
            "pipeline start"
        );

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut outcomes = Vec::with_capacity(self.settings.problems.len());
        for (name, spec) in &self.settings.problems {
            let outcome = self.run_problem(&kb, name, spec, &mut rng, factory, sampler)?;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    fn run_problem(
        &self,
        kb: &KnowledgeBase,
        name: &str,
        spec: &ProblemSpec,
        rng: &mut StdRng,
        factory: &dyn LearnerFactory,
        sampler: &mut dyn HyperparameterSampler,
    ) -> AutoClResult<ProblemOutcome> {
        let started = Instant::now();
        tracing::info!(problem = name, "learning problem start");

        let split = split_problem(
            rng,
            spec.positive_examples.iter().cloned().collect(),
            spec.negative_examples.iter().cloned().collect(),
        );
        let train_lp = split.train_lp();
        if train_lp.is_empty() {
            return Err(LearnError::EmptyTrainingSplit {
                concept: name.to_string(),
            }
            .into());
        }

        let features = select_features(
            kb,
            &train_lp,
            factory,
            name,
            self.config.top_k,
            &self.reporter,
        )?;

        let reduced;
        let active_kb = if features.is_empty() {
            tracing::warn!(
                problem = name,
                "empty feature set, continuing with the original knowledge base"
            );
            kb
        } else {
            reduced = reduce_to_features(kb, &features, &self.reporter.reduced_kb_path(name))?;
            &reduced
        };

        let mut table = TrialTable::new();
        let tuner = Tuner {
            kb: active_kb,
            train: &train_lp,
            validation_pos: &split.positive.validation,
            validation_neg: &split.negative.validation,
        };
        tuner.run(
            name,
            factory,
            sampler,
            &self.config.search_space,
            self.config.trials,
            &mut table,
        )?;
        table.to_csv(&self.reporter.trials_csv_path(name))?;

        let best = table
            .best()
            .ok_or(TuneError::EmptyTable)?
            .clone();
        self.reporter.log_best_trial(&best)?;
        tracing::info!(problem = name, config = %best.config, "best trial selected");

        let final_started = Instant::now();
        let mut learner = factory.build(&best.config);
        learner.fit(active_kb, &train_lp)?;
        let top = learner.best_hypotheses(3);
        self.reporter.write_predictions(name, &top)?;
        let hypothesis = top.first().cloned().ok_or_else(|| LearnError::NoHypotheses {
            concept: name.to_string(),
        })?;

        let test_individuals = split.test_individuals();
        let predictions = hypothesis.classify(active_kb, &test_individuals)?;
        let test_pos: BTreeSet<Individual> = split.positive.test.iter().cloned().collect();
        let test_neg: BTreeSet<Individual> = split.negative.test.iter().cloned().collect();
        let score = score_predictions(&predictions, &test_pos, &test_neg);

        let outcome = ProblemOutcome {
            problem: name.to_string(),
            concept: hypothesis.expression.to_string(),
            quality: hypothesis.quality,
            test_f1: score.reported_f1(),
            test_accuracy: score.reported_accuracy(),
            selected_features: features,
            best_config: best.config,
            trials: table.len(),
            elapsed: started.elapsed(),
            final_stage_elapsed: final_started.elapsed(),
        };
        self.reporter.log_outcome(&outcome)?;
        tracing::info!(
            problem = name,
            concept = %outcome.concept,
            test_f1 = outcome.test_f1,
            test_accuracy = outcome.test_accuracy,
            elapsed_secs = outcome.elapsed.as_secs_f64(),
            "learning problem finished"
        );
        Ok(outcome)
    }
}
