//! Knowledge base: a file-backed OWL ontology behind an oxigraph [`Store`].
//!
//! The knowledge base is the single storage layer of the pipeline. It loads
//! an ontology artifact, enumerates declared object/data properties and
//! classes, and answers asserted-triple instance checks for class
//! expressions. No OWL reasoning is performed: an individual satisfies a
//! class exactly when the corresponding triples are asserted.
//!
//! Property enumeration failures are logged and degrade to an empty result;
//! everything else propagates.

pub mod reduce;

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use oxigraph::io::RdfFormat;
use oxigraph::model::{GraphNameRef, NamedNode, Term};
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;

use crate::concept::{ClassExpression, NamedEntity};
use crate::error::KbError;
use crate::individual::Individual;

pub type KbResult<T> = std::result::Result<T, KbError>;

const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
const OWL_CLASS: &str = "http://www.w3.org/2002/07/owl#Class";
const OWL_OBJECT_PROPERTY: &str = "http://www.w3.org/2002/07/owl#ObjectProperty";
const OWL_DATATYPE_PROPERTY: &str = "http://www.w3.org/2002/07/owl#DatatypeProperty";

/// Whether a property relates individuals or carries literal values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Object,
    Data,
}

impl std::fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyKind::Object => write!(f, "object"),
            PropertyKind::Data => write!(f, "data"),
        }
    }
}

/// A declared ontology property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OntologyProperty {
    pub entity: NamedEntity,
    pub kind: PropertyKind,
}

impl OntologyProperty {
    /// The property's local name, used for feature matching and pruning.
    pub fn name(&self) -> &str {
        self.entity.name()
    }

    pub fn iri(&self) -> &str {
        &self.entity.iri
    }
}

/// Pick the RDF serialization format from a file extension.
fn format_for(path: &Path) -> KbResult<RdfFormat> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "owl" | "rdf" | "xml" => Ok(RdfFormat::RdfXml),
        "ttl" | "turtle" => Ok(RdfFormat::Turtle),
        "nt" => Ok(RdfFormat::NTriples),
        _ => Err(KbError::UnsupportedFormat {
            path: path.display().to_string(),
        }),
    }
}

/// A queryable handle over an ontology artifact.
pub struct KnowledgeBase {
    store: Store,
    path: PathBuf,
}

impl KnowledgeBase {
    /// Load an ontology file into a fresh in-memory store.
    pub fn open(path: &Path) -> KbResult<Self> {
        let format = format_for(path)?;
        let file = File::open(path).map_err(|e| KbError::Load {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let store = Store::new().map_err(|e| KbError::Load {
            path: path.display().to_string(),
            message: format!("failed to create store: {e}"),
        })?;
        store
            .load_from_reader(format, BufReader::new(file))
            .map_err(|e| KbError::Load {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            store,
            path: path.to_path_buf(),
        })
    }

    pub(crate) fn from_parts(store: Store, path: PathBuf) -> Self {
        Self { store, path }
    }

    /// The backing artifact path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn store(&self) -> &Store {
        &self.store
    }

    /// Serialize the default graph to `path`, format chosen by extension.
    pub fn save_as(&self, path: &Path) -> KbResult<()> {
        let format = format_for(path)?;
        let file = File::create(path).map_err(|e| KbError::Save {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        self.store
            .dump_graph_to_writer(GraphNameRef::DefaultGraph, format, BufWriter::new(file))
            .map_err(|e| KbError::Save {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    /// Number of asserted triples.
    pub fn triple_count(&self) -> usize {
        self.store.len().unwrap_or(0)
    }

    /// Declared object properties. Enumeration failures are logged and
    /// degrade to an empty list.
    pub fn object_properties(&self) -> Vec<OntologyProperty> {
        self.entities_of_type(OWL_OBJECT_PROPERTY)
            .map(|entities| {
                entities
                    .into_iter()
                    .map(|entity| OntologyProperty {
                        entity,
                        kind: PropertyKind::Object,
                    })
                    .collect()
            })
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "object property enumeration failed");
                Vec::new()
            })
    }

    /// Declared data properties. Enumeration failures are logged and
    /// degrade to an empty list.
    pub fn data_properties(&self) -> Vec<OntologyProperty> {
        self.entities_of_type(OWL_DATATYPE_PROPERTY)
            .map(|entities| {
                entities
                    .into_iter()
                    .map(|entity| OntologyProperty {
                        entity,
                        kind: PropertyKind::Data,
                    })
                    .collect()
            })
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "data property enumeration failed");
                Vec::new()
            })
    }

    /// All declared properties, object properties first.
    pub fn properties(&self) -> Vec<OntologyProperty> {
        let mut props = self.object_properties();
        props.extend(self.data_properties());
        props
    }

    /// Declared named classes. Failures are logged and degrade to empty.
    pub fn classes(&self) -> Vec<NamedEntity> {
        self.entities_of_type(OWL_CLASS).unwrap_or_else(|e| {
            tracing::error!(error = %e, "class enumeration failed");
            Vec::new()
        })
    }

    /// Asserted-triple instance check: does `individual` satisfy `expr`?
    pub fn satisfies(&self, individual: &Individual, expr: &ClassExpression) -> KbResult<bool> {
        match expr {
            ClassExpression::Top => Ok(true),
            ClassExpression::Bottom => Ok(false),
            ClassExpression::Class(class) => {
                let ind = checked_iri(individual.iri())?;
                let class = checked_iri(&class.iri)?;
                self.ask(&format!("ASK {{ <{ind}> <{RDF_TYPE}> <{class}> }}"))
            }
            ClassExpression::Not(inner) => Ok(!self.satisfies(individual, inner)?),
            ClassExpression::And(ops) => {
                for op in ops {
                    if !self.satisfies(individual, op)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            ClassExpression::Or(ops) => {
                for op in ops {
                    if self.satisfies(individual, op)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            ClassExpression::Some { property, filler } => {
                if matches!(**filler, ClassExpression::Top) {
                    let ind = checked_iri(individual.iri())?;
                    let prop = checked_iri(&property.iri)?;
                    return self.ask(&format!("ASK {{ <{ind}> <{prop}> ?o }}"));
                }
                for object in self.objects_of(individual, &property.iri)? {
                    if self.satisfies(&object, filler)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            ClassExpression::Only { property, filler } => {
                // Vacuously true for individuals with no assertion on the property.
                for object in self.objects_of(individual, &property.iri)? {
                    if !self.satisfies(&object, filler)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            ClassExpression::HasValue { property, value } => {
                let values = self.literal_values_of(individual, &property.iri)?;
                Ok(values.iter().any(|v| v == value))
            }
        }
    }

    /// Named-node objects of `(individual, property, ?o)` assertions.
    pub fn objects_of(&self, individual: &Individual, property_iri: &str) -> KbResult<Vec<Individual>> {
        let ind = checked_iri(individual.iri())?;
        let prop = checked_iri(property_iri)?;
        let mut objects = Vec::new();
        for term in self.select_terms(&format!("SELECT ?o WHERE {{ <{ind}> <{prop}> ?o }}"), "o")? {
            if let Term::NamedNode(node) = term {
                objects.push(Individual::new(node.into_string()));
            }
        }
        Ok(objects)
    }

    /// Lexical forms of literal objects of `(individual, property, ?o)`.
    pub fn literal_values_of(
        &self,
        individual: &Individual,
        property_iri: &str,
    ) -> KbResult<Vec<String>> {
        let ind = checked_iri(individual.iri())?;
        let prop = checked_iri(property_iri)?;
        let mut values = Vec::new();
        for term in self.select_terms(&format!("SELECT ?o WHERE {{ <{ind}> <{prop}> ?o }}"), "o")? {
            if let Term::Literal(lit) = term {
                values.push(lit.value().to_string());
            }
        }
        Ok(values)
    }

    /// Distinct literal values asserted for a data property across all
    /// individuals, used by learners to propose `HasValue` candidates.
    pub fn distinct_values_of_property(&self, property_iri: &str) -> KbResult<BTreeSet<String>> {
        let prop = checked_iri(property_iri)?;
        let mut values = BTreeSet::new();
        for term in
            self.select_terms(&format!("SELECT DISTINCT ?o WHERE {{ ?s <{prop}> ?o }}"), "o")?
        {
            if let Term::Literal(lit) = term {
                values.insert(lit.value().to_string());
            }
        }
        Ok(values)
    }

    fn entities_of_type(&self, type_iri: &str) -> KbResult<Vec<NamedEntity>> {
        let terms = self.select_terms(
            &format!("SELECT DISTINCT ?e WHERE {{ ?e <{RDF_TYPE}> <{type_iri}> }}"),
            "e",
        )?;
        let mut entities: Vec<NamedEntity> = terms
            .into_iter()
            .filter_map(|term| match term {
                Term::NamedNode(node) => Some(NamedEntity::new(node.into_string())),
                _ => None,
            })
            .collect();
        entities.sort();
        Ok(entities)
    }

    fn ask(&self, query: &str) -> KbResult<bool> {
        let results = self.store.query(query).map_err(|e| KbError::Sparql {
            message: format!("ASK failed: {e}"),
        })?;
        match results {
            QueryResults::Boolean(b) => Ok(b),
            _ => Err(KbError::Sparql {
                message: "unexpected result type from ASK query".into(),
            }),
        }
    }

    fn select_terms(&self, query: &str, var: &str) -> KbResult<Vec<Term>> {
        let results = self.store.query(query).map_err(|e| KbError::Sparql {
            message: format!("SELECT failed: {e}"),
        })?;
        match results {
            QueryResults::Solutions(solutions) => {
                let mut terms = Vec::new();
                for solution in solutions {
                    let solution = solution.map_err(|e| KbError::Sparql {
                        message: format!("solution error: {e}"),
                    })?;
                    if let Some(term) = solution.get(var) {
                        terms.push(term.clone());
                    }
                }
                Ok(terms)
            }
            _ => Err(KbError::Sparql {
                message: "unexpected result type from SELECT query".into(),
            }),
        }
    }
}

impl std::fmt::Debug for KnowledgeBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeBase")
            .field("path", &self.path)
            .field("triples", &self.triple_count())
            .finish()
    }
}

/// Validate an IRI before splicing it into a SPARQL query.
fn checked_iri(iri: &str) -> KbResult<&str> {
    NamedNode::new(iri).map_err(|_| KbError::InvalidIri {
        iri: iri.to_string(),
    })?;
    Ok(iri)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    pub(crate) const FAMILY_TTL: &str = r#"
@prefix : <http://example.org/family#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .

:Female rdf:type owl:Class .
:Male rdf:type owl:Class .
:hasSibling rdf:type owl:ObjectProperty .
:hasChild rdf:type owl:ObjectProperty .
:age rdf:type owl:DatatypeProperty .

:anna rdf:type :Female ;
      :hasSibling :heinz ;
      :age "42" .
:heinz rdf:type :Male ;
       :hasSibling :anna .
:marta rdf:type :Female ;
       :hasChild :anna .
"#;

    pub(crate) fn family_kb(dir: &Path) -> KnowledgeBase {
        let path = dir.join("family.ttl");
        let mut f = File::create(&path).unwrap();
        f.write_all(FAMILY_TTL.as_bytes()).unwrap();
        KnowledgeBase::open(&path).unwrap()
    }

    fn ind(local: &str) -> Individual {
        Individual::new(format!("http://example.org/family#{local}"))
    }

    #[test]
    fn enumerates_declared_properties() {
        let dir = tempfile::TempDir::new().unwrap();
        let kb = family_kb(dir.path());

        let objects: Vec<_> = kb.object_properties().iter().map(|p| p.name().to_string()).collect();
        assert_eq!(objects, vec!["hasChild", "hasSibling"]);

        let data: Vec<_> = kb.data_properties().iter().map(|p| p.name().to_string()).collect();
        assert_eq!(data, vec!["age"]);

        assert_eq!(kb.properties().len(), 3);
    }

    #[test]
    fn enumerates_classes() {
        let dir = tempfile::TempDir::new().unwrap();
        let kb = family_kb(dir.path());
        let classes: Vec<_> = kb.classes().iter().map(|c| c.name().to_string()).collect();
        assert_eq!(classes, vec!["Female", "Male"]);
    }

    #[test]
    fn satisfies_named_class() {
        let dir = tempfile::TempDir::new().unwrap();
        let kb = family_kb(dir.path());
        let female = ClassExpression::class("http://example.org/family#Female");
        assert!(kb.satisfies(&ind("anna"), &female).unwrap());
        assert!(!kb.satisfies(&ind("heinz"), &female).unwrap());
    }

    #[test]
    fn satisfies_existential_restriction() {
        let dir = tempfile::TempDir::new().unwrap();
        let kb = family_kb(dir.path());
        let has_child = ClassExpression::some("http://example.org/family#hasChild", ClassExpression::Top);
        assert!(kb.satisfies(&ind("marta"), &has_child).unwrap());
        assert!(!kb.satisfies(&ind("anna"), &has_child).unwrap());

        // Nested filler: ∃ hasChild.Female
        let has_female_child = ClassExpression::some(
            "http://example.org/family#hasChild",
            ClassExpression::class("http://example.org/family#Female"),
        );
        assert!(kb.satisfies(&ind("marta"), &has_female_child).unwrap());
    }

    #[test]
    fn satisfies_boolean_combinations() {
        let dir = tempfile::TempDir::new().unwrap();
        let kb = family_kb(dir.path());
        let female = ClassExpression::class("http://example.org/family#Female");
        let has_sibling =
            ClassExpression::some("http://example.org/family#hasSibling", ClassExpression::Top);

        let both = ClassExpression::and(vec![female.clone(), has_sibling]);
        assert!(kb.satisfies(&ind("anna"), &both).unwrap());
        assert!(!kb.satisfies(&ind("marta"), &both).unwrap());

        let not_female = ClassExpression::Not(Box::new(female));
        assert!(kb.satisfies(&ind("heinz"), &not_female).unwrap());
    }

    #[test]
    fn satisfies_has_value() {
        let dir = tempfile::TempDir::new().unwrap();
        let kb = family_kb(dir.path());
        let aged_42 = ClassExpression::has_value("http://example.org/family#age", "42");
        assert!(kb.satisfies(&ind("anna"), &aged_42).unwrap());
        assert!(!kb.satisfies(&ind("heinz"), &aged_42).unwrap());
    }

    #[test]
    fn universal_restriction_is_vacuously_true() {
        let dir = tempfile::TempDir::new().unwrap();
        let kb = family_kb(dir.path());
        let only_female = ClassExpression::only(
            "http://example.org/family#hasSibling",
            ClassExpression::class("http://example.org/family#Female"),
        );
        // heinz's only sibling is anna (Female).
        assert!(kb.satisfies(&ind("heinz"), &only_female).unwrap());
        // anna's only sibling is heinz (not Female).
        assert!(!kb.satisfies(&ind("anna"), &only_female).unwrap());
        // marta has no siblings at all.
        assert!(kb.satisfies(&ind("marta"), &only_female).unwrap());
    }

    #[test]
    fn invalid_iri_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let kb = family_kb(dir.path());
        let bad = Individual::new("not an iri");
        let female = ClassExpression::class("http://example.org/family#Female");
        assert!(matches!(
            kb.satisfies(&bad, &female),
            Err(KbError::InvalidIri { .. })
        ));
    }

    #[test]
    fn save_and_reopen_round_trips() {
        let dir = tempfile::TempDir::new().unwrap();
        let kb = family_kb(dir.path());
        let copy_path = dir.path().join("copy.ttl");
        kb.save_as(&copy_path).unwrap();

        let copy = KnowledgeBase::open(&copy_path).unwrap();
        assert_eq!(copy.triple_count(), kb.triple_count());
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = KnowledgeBase::open(Path::new("onto.json")).unwrap_err();
        assert!(matches!(err, KbError::UnsupportedFormat { .. }));
    }
}
