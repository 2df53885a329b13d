//! Feature selection: mine the ontology properties referenced by a
//! learner's top-K hypotheses.
//!
//! A learner with default hyperparameters is fitted on the training learning
//! problem against the *original* knowledge base. Property names are
//! collected structurally from each hypothesis's expression tree and
//! intersected with the ontology's declared properties; the union across all
//! K hypotheses is the selected feature set. Zero hypotheses yield an empty
//! set, not an error.

use std::collections::BTreeSet;

use crate::error::AutoClResult;
use crate::individual::LearningProblem;
use crate::kb::KnowledgeBase;
use crate::learn::{LearnerConfig, LearnerFactory};
use crate::report::RunReporter;

/// Run feature selection for one learning problem.
///
/// Side effects: persists the top-K hypotheses to the per-concept
/// predictions artifact and appends them to the run report.
pub fn select_features(
    kb: &KnowledgeBase,
    train: &LearningProblem,
    factory: &dyn LearnerFactory,
    concept: &str,
    top_k: usize,
    reporter: &RunReporter,
) -> AutoClResult<BTreeSet<String>> {
    let mut learner = factory.build(&LearnerConfig::default());
    learner.fit(kb, train)?;
    let hypotheses = learner.best_hypotheses(top_k);

    reporter.write_predictions(concept, &hypotheses)?;
    reporter.log_hypotheses(concept, &hypotheses)?;

    if hypotheses.is_empty() {
        tracing::warn!(concept, "feature selection produced no hypotheses");
        return Ok(BTreeSet::new());
    }

    let declared: BTreeSet<String> = kb
        .properties()
        .iter()
        .map(|p| p.name().to_string())
        .collect();

    let mut selected = BTreeSet::new();
    for hypothesis in &hypotheses {
        for name in hypothesis.expression.property_names() {
            if declared.contains(&name) {
                selected.insert(name);
            }
        }
    }
    tracing::info!(
        concept,
        hypotheses = hypotheses.len(),
        features = selected.len(),
        "selected features"
    );
    Ok(selected)
}
