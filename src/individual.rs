//! Individuals and learning problems.
//!
//! An [`Individual`] is an opaque, ontology-resolvable identifier (an IRI).
//! A [`LearningProblem`] is the immutable pair of disjoint positive/negative
//! individual sets that a concept-learning run is fitted against.

use serde::{Deserialize, Serialize};

/// An ontology individual, identified by its IRI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Individual(String);

impl Individual {
    /// Create an individual from an IRI string.
    pub fn new(iri: impl Into<String>) -> Self {
        Individual(iri.into())
    }

    /// The full IRI of this individual.
    pub fn iri(&self) -> &str {
        &self.0
    }

    /// The local part of the IRI (after the last `#` or `/`).
    pub fn local_name(&self) -> &str {
        local_part(&self.0)
    }
}

impl std::fmt::Display for Individual {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Individual {
    fn from(iri: &str) -> Self {
        Individual(iri.to_string())
    }
}

/// Extract the local part of an IRI: the segment after the last `#`,
/// falling back to the last `/` segment, falling back to the whole string.
pub(crate) fn local_part(iri: &str) -> &str {
    iri.rsplit_once('#')
        .or_else(|| iri.rsplit_once('/'))
        .map(|(_, local)| local)
        .unwrap_or(iri)
}

/// A supervised concept-learning target: disjoint positive and negative
/// individual sets. Constructed per dataset split; never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearningProblem {
    positive: Vec<Individual>,
    negative: Vec<Individual>,
}

impl LearningProblem {
    /// Create a learning problem from positive and negative example sets.
    pub fn new(positive: Vec<Individual>, negative: Vec<Individual>) -> Self {
        Self { positive, negative }
    }

    /// Positive examples.
    pub fn positive(&self) -> &[Individual] {
        &self.positive
    }

    /// Negative examples.
    pub fn negative(&self) -> &[Individual] {
        &self.negative
    }

    /// Total number of examples across both polarities.
    pub fn len(&self) -> usize {
        self.positive.len() + self.negative.len()
    }

    /// True when both polarity sets are empty.
    pub fn is_empty(&self) -> bool {
        self.positive.is_empty() && self.negative.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_name_after_hash() {
        let ind = Individual::new("http://example.org/family#anna");
        assert_eq!(ind.local_name(), "anna");
        assert_eq!(ind.iri(), "http://example.org/family#anna");
    }

    #[test]
    fn local_name_after_slash() {
        let ind = Individual::new("http://example.org/family/anna");
        assert_eq!(ind.local_name(), "anna");
    }

    #[test]
    fn local_name_without_separator() {
        let ind = Individual::new("anna");
        assert_eq!(ind.local_name(), "anna");
    }

    #[test]
    fn learning_problem_len() {
        let lp = LearningProblem::new(
            vec![Individual::from("http://e.org#a")],
            vec![Individual::from("http://e.org#b"), Individual::from("http://e.org#c")],
        );
        assert_eq!(lp.len(), 3);
        assert!(!lp.is_empty());
    }
}
