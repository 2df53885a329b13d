//! Baseline concept learner: bounded beam refinement over class expressions.
//!
//! Deliberately simple (no evolutionary or model-based search): atomic
//! candidates are the named classes, their negations, existential
//! restrictions over object properties (unqualified and class-qualified one
//! level deep) and `HasValue` atoms over data properties; deeper iterations
//! conjoin the best candidates so far with the atoms. Every candidate is
//! scored on the training split with the configured quality function, under
//! the budgets in [`LearnerConfig`].

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use super::{ConceptLearner, Hypothesis, LearnResult, LearnerConfig, LearnerFactory};
use crate::concept::ClassExpression;
use crate::individual::LearningProblem;
use crate::kb::KnowledgeBase;
use crate::metrics::Confusion;

/// Beam width for the conjunction-refinement rounds.
const BEAM_WIDTH: usize = 8;
/// Cap on `HasValue` atoms generated per data property.
const MAX_VALUES_PER_PROPERTY: usize = 16;

/// The shipped default [`ConceptLearner`].
pub struct RefinementLearner {
    config: LearnerConfig,
    hypotheses: Vec<Hypothesis>,
}

impl RefinementLearner {
    pub fn new(config: LearnerConfig) -> Self {
        Self {
            config,
            hypotheses: Vec::new(),
        }
    }

    /// Atomic candidate expressions derivable from the knowledge base.
    fn atoms(&self, kb: &KnowledgeBase) -> LearnResult<Vec<ClassExpression>> {
        let mut atoms = vec![ClassExpression::Top];

        let classes = kb.classes();
        for class in &classes {
            atoms.push(ClassExpression::Class(class.clone()));
            atoms.push(ClassExpression::Not(Box::new(ClassExpression::Class(
                class.clone(),
            ))));
        }
        for prop in kb.object_properties() {
            atoms.push(ClassExpression::some(
                prop.iri().to_string(),
                ClassExpression::Top,
            ));
            for class in &classes {
                atoms.push(ClassExpression::some(
                    prop.iri().to_string(),
                    ClassExpression::Class(class.clone()),
                ));
            }
        }
        for prop in kb.data_properties() {
            let values = kb.distinct_values_of_property(prop.iri())?;
            for value in values.into_iter().take(MAX_VALUES_PER_PROPERTY) {
                atoms.push(ClassExpression::has_value(prop.iri().to_string(), value));
            }
        }
        Ok(atoms)
    }

    fn score(
        &self,
        kb: &KnowledgeBase,
        lp: &LearningProblem,
        expr: &ClassExpression,
    ) -> LearnResult<f64> {
        let mut pairs = Vec::with_capacity(lp.len());
        for ind in lp.positive() {
            pairs.push((kb.satisfies(ind, expr)?, true));
        }
        for ind in lp.negative() {
            pairs.push((kb.satisfies(ind, expr)?, false));
        }
        let confusion = Confusion::tally(pairs);
        Ok(self.config.quality.compute(&confusion))
    }
}

/// Conjoin two expressions, flattening nested ⊓ chains.
fn conjoin(left: &ClassExpression, right: &ClassExpression) -> ClassExpression {
    let mut operands = Vec::new();
    for expr in [left, right] {
        match expr {
            ClassExpression::And(ops) => operands.extend(ops.iter().cloned()),
            other => operands.push(other.clone()),
        }
    }
    operands.dedup();
    ClassExpression::And(operands)
}

impl ConceptLearner for RefinementLearner {
    fn fit(&mut self, kb: &KnowledgeBase, lp: &LearningProblem) -> LearnResult<()> {
        let deadline = Instant::now() + Duration::from_secs(self.config.max_runtime_secs);
        let atoms = self.atoms(kb)?;

        let mut scored: Vec<Hypothesis> = Vec::new();
        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut frontier = atoms.clone();
        let mut tested = 0usize;

        'rounds: for round in 0..self.config.iter_bound.max(1) {
            for candidate in frontier.drain(..) {
                if !seen.insert(candidate.to_string()) {
                    continue;
                }
                if tested >= self.config.max_concepts_tested || Instant::now() >= deadline {
                    break 'rounds;
                }
                let quality = self.score(kb, lp, &candidate)?;
                tested += 1;
                scored.push(Hypothesis {
                    expression: candidate,
                    quality,
                });
            }

            if round + 1 == self.config.iter_bound {
                break;
            }
            rank(&mut scored);
            for best in scored.iter().take(BEAM_WIDTH) {
                for atom in &atoms {
                    if matches!(atom, ClassExpression::Top) {
                        continue;
                    }
                    let refined = conjoin(&best.expression, atom);
                    if !seen.contains(&refined.to_string()) {
                        frontier.push(refined);
                    }
                }
            }
            // Saturated: nothing new to test.
            if frontier.is_empty() {
                break;
            }
        }

        rank(&mut scored);
        tracing::debug!(tested, kept = scored.len(), "refinement fit finished");
        self.hypotheses = scored;
        Ok(())
    }

    fn best_hypotheses(&self, n: usize) -> Vec<Hypothesis> {
        self.hypotheses.iter().take(n).cloned().collect()
    }
}

/// Quality descending, then smaller expressions first; stable for
/// insertion-order residue.
fn rank(hypotheses: &mut [Hypothesis]) {
    hypotheses.sort_by(|a, b| {
        b.quality
            .partial_cmp(&a.quality)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.expression.size().cmp(&b.expression.size()))
    });
}

/// Factory for the baseline learner.
pub struct RefinementFactory;

impl LearnerFactory for RefinementFactory {
    fn build(&self, config: &LearnerConfig) -> Box<dyn ConceptLearner> {
        Box::new(RefinementLearner::new(*config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::individual::Individual;
    use crate::kb::tests::family_kb;
    use crate::learn::QualityFunction;

    fn ind(local: &str) -> Individual {
        Individual::new(format!("http://example.org/family#{local}"))
    }

    fn female_lp() -> LearningProblem {
        LearningProblem::new(vec![ind("anna"), ind("marta")], vec![ind("heinz")])
    }

    #[test]
    fn learns_a_perfect_named_class_concept() {
        let dir = tempfile::TempDir::new().unwrap();
        let kb = family_kb(dir.path());
        let mut learner = RefinementLearner::new(LearnerConfig::default());
        learner.fit(&kb, &female_lp()).unwrap();

        let best = learner.best_hypothesis().unwrap();
        assert_eq!(best.quality, 1.0);
        assert_eq!(best.expression.to_string(), "Female");
    }

    #[test]
    fn hypotheses_are_ranked_best_first() {
        let dir = tempfile::TempDir::new().unwrap();
        let kb = family_kb(dir.path());
        let mut learner = RefinementLearner::new(LearnerConfig::default());
        learner.fit(&kb, &female_lp()).unwrap();

        let top = learner.best_hypotheses(10);
        assert!(top.len() > 1);
        for pair in top.windows(2) {
            assert!(pair[0].quality >= pair[1].quality);
        }
    }

    #[test]
    fn honors_max_concepts_tested() {
        let dir = tempfile::TempDir::new().unwrap();
        let kb = family_kb(dir.path());
        let mut learner = RefinementLearner::new(LearnerConfig {
            max_concepts_tested: 1,
            ..Default::default()
        });
        learner.fit(&kb, &female_lp()).unwrap();
        assert_eq!(learner.best_hypotheses(100).len(), 1);
    }

    #[test]
    fn accuracy_quality_changes_scores_not_interface() {
        let dir = tempfile::TempDir::new().unwrap();
        let kb = family_kb(dir.path());
        let mut learner = RefinementLearner::new(LearnerConfig {
            quality: QualityFunction::Accuracy,
            ..Default::default()
        });
        learner.fit(&kb, &female_lp()).unwrap();
        assert_eq!(learner.best_hypothesis().unwrap().quality, 1.0);
    }

    #[test]
    fn empty_training_split_yields_zero_quality_hypotheses() {
        let dir = tempfile::TempDir::new().unwrap();
        let kb = family_kb(dir.path());
        let mut learner = RefinementLearner::new(LearnerConfig::default());
        learner
            .fit(&kb, &LearningProblem::new(Vec::new(), Vec::new()))
            .unwrap();
        let best = learner.best_hypothesis().unwrap();
        assert_eq!(best.quality, 0.0);
    }

    #[test]
    fn classify_labels_test_individuals() {
        let dir = tempfile::TempDir::new().unwrap();
        let kb = family_kb(dir.path());
        let mut learner = RefinementLearner::new(LearnerConfig::default());
        learner.fit(&kb, &female_lp()).unwrap();

        let best = learner.best_hypothesis().unwrap();
        let labels = best.classify(&kb, &[ind("anna"), ind("heinz")]).unwrap();
        assert_eq!(labels[0].1, true);
        assert_eq!(labels[1].1, false);
    }
}
