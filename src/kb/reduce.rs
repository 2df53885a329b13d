//! Knowledge-base reduction: prune every property outside a keep set.
//!
//! Reduction is copy-based. The original store is never mutated; its quads
//! are streamed into a fresh store, the dropped properties are deleted there
//! (declaration, usage, and any axiom referencing them), and the result is
//! serialized to a per-problem artifact path and returned as a new
//! [`KnowledgeBase`].

use std::collections::BTreeSet;
use std::path::Path;

use oxigraph::store::Store;

use super::{KbResult, KnowledgeBase, OntologyProperty};
use crate::error::KbError;

/// Build a reduced knowledge base containing only the properties whose local
/// names appear in `keep`, saved to `output_path`.
///
/// Returns the fresh handle bound to the new artifact. The input knowledge
/// base stays read-only throughout.
pub fn reduce_to_features(
    kb: &KnowledgeBase,
    keep: &BTreeSet<String>,
    output_path: &Path,
) -> KbResult<KnowledgeBase> {
    let dropped: Vec<OntologyProperty> = kb
        .properties()
        .into_iter()
        .filter(|p| !keep.contains(p.name()))
        .collect();

    let reduced = Store::new().map_err(|e| KbError::Save {
        path: output_path.display().to_string(),
        message: format!("failed to create store: {e}"),
    })?;
    for quad in kb.store().iter() {
        let quad = quad.map_err(|e| KbError::Sparql {
            message: format!("quad iteration failed: {e}"),
        })?;
        reduced.insert(&quad).map_err(|e| KbError::Sparql {
            message: format!("quad insert failed: {e}"),
        })?;
    }

    for prop in &dropped {
        let iri = prop.iri();
        // Declaration and axioms where the property is the subject, every
        // usage as a predicate, and references as an object (e.g. in
        // owl:onProperty restrictions).
        let update = format!(
            "DELETE WHERE {{ <{iri}> ?p ?o }} ;\n\
             DELETE WHERE {{ ?s <{iri}> ?o }} ;\n\
             DELETE WHERE {{ ?s ?p <{iri}> }}"
        );
        reduced.update(update.as_str()).map_err(|e| KbError::Sparql {
            message: format!("property removal failed for {iri}: {e}"),
        })?;
    }

    tracing::info!(
        kept = keep.len(),
        dropped = dropped.len(),
        artifact = %output_path.display(),
        "reduced knowledge base"
    );

    let out = KnowledgeBase::from_parts(reduced, output_path.to_path_buf());
    out.save_as(output_path)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concept::ClassExpression;
    use crate::individual::Individual;
    use crate::kb::tests::family_kb;

    fn keep(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn reduced_properties_are_a_subset_of_the_keep_set() {
        let dir = tempfile::TempDir::new().unwrap();
        let kb = family_kb(dir.path());
        let out = dir.path().join("reduced_aunt.ttl");

        let reduced = reduce_to_features(&kb, &keep(&["hasSibling"]), &out).unwrap();
        let names: Vec<_> = reduced.properties().iter().map(|p| p.name().to_string()).collect();
        assert_eq!(names, vec!["hasSibling"]);
    }

    #[test]
    fn dropped_property_is_no_longer_resolvable() {
        let dir = tempfile::TempDir::new().unwrap();
        let kb = family_kb(dir.path());
        let out = dir.path().join("reduced.ttl");
        let reduced = reduce_to_features(&kb, &keep(&["hasSibling"]), &out).unwrap();

        let marta = Individual::new("http://example.org/family#marta");
        let has_child =
            ClassExpression::some("http://example.org/family#hasChild", ClassExpression::Top);
        // Satisfied in the original, gone from the reduction.
        assert!(kb.satisfies(&marta, &has_child).unwrap());
        assert!(!reduced.satisfies(&marta, &has_child).unwrap());
    }

    #[test]
    fn original_kb_is_untouched() {
        let dir = tempfile::TempDir::new().unwrap();
        let kb = family_kb(dir.path());
        let before = kb.triple_count();
        let out = dir.path().join("reduced.ttl");
        let _ = reduce_to_features(&kb, &BTreeSet::new(), &out).unwrap();
        assert_eq!(kb.triple_count(), before);
        assert_eq!(kb.properties().len(), 3);
    }

    #[test]
    fn empty_keep_set_prunes_every_property() {
        let dir = tempfile::TempDir::new().unwrap();
        let kb = family_kb(dir.path());
        let out = dir.path().join("reduced.ttl");
        let reduced = reduce_to_features(&kb, &BTreeSet::new(), &out).unwrap();
        assert!(reduced.properties().is_empty());
        // Class assertions survive; only properties are pruned.
        assert_eq!(reduced.classes().len(), 2);
    }

    #[test]
    fn artifact_is_reloadable_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let kb = family_kb(dir.path());
        let out = dir.path().join("reduced.ttl");
        let reduced = reduce_to_features(&kb, &keep(&["age"]), &out).unwrap();

        let reloaded = KnowledgeBase::open(&out).unwrap();
        assert_eq!(reloaded.triple_count(), reduced.triple_count());
        let names: Vec<_> = reloaded.properties().iter().map(|p| p.name().to_string()).collect();
        assert_eq!(names, vec!["age"]);
    }
}
