//! Class expressions: the concept AST shared by learners and the
//! feature selector.
//!
//! Hypotheses are represented as a small description-logic expression tree
//! rather than rendered text, so the feature selector can collect referenced
//! properties structurally instead of by substring matching (a property named
//! `has` must not match a concept mentioning `hasSibling`). The `Display`
//! impl renders standard DL syntax (⊤, ⊥, ¬, ⊓, ⊔, ∃, ∀) for reports and
//! artifacts.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::individual::local_part;

/// A named ontology entity (class or property) identified by IRI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamedEntity {
    pub iri: String,
}

impl NamedEntity {
    pub fn new(iri: impl Into<String>) -> Self {
        Self { iri: iri.into() }
    }

    /// The local part of the IRI, used for rendering and feature matching.
    pub fn name(&self) -> &str {
        local_part(&self.iri)
    }
}

impl std::fmt::Display for NamedEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A class expression in the learner's concept language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassExpression {
    /// ⊤ — every individual.
    Top,
    /// ⊥ — no individual.
    Bottom,
    /// A named class.
    Class(NamedEntity),
    /// ¬C
    Not(Box<ClassExpression>),
    /// C₁ ⊓ C₂ ⊓ …
    And(Vec<ClassExpression>),
    /// C₁ ⊔ C₂ ⊔ …
    Or(Vec<ClassExpression>),
    /// ∃ p.C — existential restriction on an object property.
    Some {
        property: NamedEntity,
        filler: Box<ClassExpression>,
    },
    /// ∀ p.C — universal restriction on an object property.
    Only {
        property: NamedEntity,
        filler: Box<ClassExpression>,
    },
    /// ∃ p.{v} — a data property carrying a specific literal value.
    HasValue { property: NamedEntity, value: String },
}

impl ClassExpression {
    pub fn class(iri: impl Into<String>) -> Self {
        ClassExpression::Class(NamedEntity::new(iri))
    }

    pub fn some(property_iri: impl Into<String>, filler: ClassExpression) -> Self {
        ClassExpression::Some {
            property: NamedEntity::new(property_iri),
            filler: Box::new(filler),
        }
    }

    pub fn only(property_iri: impl Into<String>, filler: ClassExpression) -> Self {
        ClassExpression::Only {
            property: NamedEntity::new(property_iri),
            filler: Box::new(filler),
        }
    }

    pub fn has_value(property_iri: impl Into<String>, value: impl Into<String>) -> Self {
        ClassExpression::HasValue {
            property: NamedEntity::new(property_iri),
            value: value.into(),
        }
    }

    pub fn and(operands: Vec<ClassExpression>) -> Self {
        ClassExpression::And(operands)
    }

    /// Collect the local names of every property referenced anywhere in this
    /// expression tree. This is the structural replacement for substring
    /// scanning of rendered concept text.
    pub fn property_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_property_names(&mut names);
        names
    }

    fn collect_property_names(&self, names: &mut BTreeSet<String>) {
        match self {
            ClassExpression::Top | ClassExpression::Bottom | ClassExpression::Class(_) => {}
            ClassExpression::Not(inner) => inner.collect_property_names(names),
            ClassExpression::And(ops) | ClassExpression::Or(ops) => {
                for op in ops {
                    op.collect_property_names(names);
                }
            }
            ClassExpression::Some { property, filler }
            | ClassExpression::Only { property, filler } => {
                names.insert(property.name().to_string());
                filler.collect_property_names(names);
            }
            ClassExpression::HasValue { property, .. } => {
                names.insert(property.name().to_string());
            }
        }
    }

    /// Number of nodes in the expression tree, a rough complexity measure
    /// used to prefer shorter hypotheses among quality ties.
    pub fn size(&self) -> usize {
        match self {
            ClassExpression::Top
            | ClassExpression::Bottom
            | ClassExpression::Class(_)
            | ClassExpression::HasValue { .. } => 1,
            ClassExpression::Not(inner) => 1 + inner.size(),
            ClassExpression::And(ops) | ClassExpression::Or(ops) => {
                1 + ops.iter().map(ClassExpression::size).sum::<usize>()
            }
            ClassExpression::Some { filler, .. } | ClassExpression::Only { filler, .. } => {
                1 + filler.size()
            }
        }
    }

    /// True when the sub-expression needs parentheses inside an ⊓/⊔ chain.
    fn is_compound(&self) -> bool {
        matches!(self, ClassExpression::And(_) | ClassExpression::Or(_))
    }

    fn fmt_operand(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_compound() {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl std::fmt::Display for ClassExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassExpression::Top => write!(f, "⊤"),
            ClassExpression::Bottom => write!(f, "⊥"),
            ClassExpression::Class(c) => write!(f, "{c}"),
            ClassExpression::Not(inner) => {
                write!(f, "¬")?;
                inner.fmt_operand(f)
            }
            ClassExpression::And(ops) => {
                for (i, op) in ops.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ⊓ ")?;
                    }
                    op.fmt_operand(f)?;
                }
                Ok(())
            }
            ClassExpression::Or(ops) => {
                for (i, op) in ops.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ⊔ ")?;
                    }
                    op.fmt_operand(f)?;
                }
                Ok(())
            }
            ClassExpression::Some { property, filler } => {
                write!(f, "∃ {property}.")?;
                filler.fmt_operand(f)
            }
            ClassExpression::Only { property, filler } => {
                write!(f, "∀ {property}.")?;
                filler.fmt_operand(f)
            }
            ClassExpression::HasValue { property, value } => {
                write!(f, "∃ {property}.{{{value}}}")
            }
        }
    }
}
