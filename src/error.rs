//! Rich diagnostic error types for the autocl pipeline.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so users know exactly what
//! went wrong and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the autocl pipeline.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, source spans) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum AutoClError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Kb(#[from] KbError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Learn(#[from] LearnError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Tune(#[from] TuneError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Report(#[from] ReportError),
}

// ---------------------------------------------------------------------------
// Settings errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SettingsError {
    #[error("failed to read settings file: {path}")]
    #[diagnostic(
        code(autocl::settings::read),
        help("Check that the settings file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file: {path}")]
    #[diagnostic(
        code(autocl::settings::parse),
        help(
            "The settings document must be JSON of the form \
             {{\"data_path\": ..., \"problems\": {{name: {{\"positive_examples\": [...], \
             \"negative_examples\": [...]}}}}}}."
        )
    )]
    Parse { path: String, message: String },

    #[error("settings file declares no learning problems: {path}")]
    #[diagnostic(
        code(autocl::settings::no_problems),
        help("Add at least one entry to the \"problems\" map.")
    )]
    NoProblems { path: String },

    #[error("learning problem \"{problem}\" has {count} individual(s) in both example sets")]
    #[diagnostic(
        code(autocl::settings::overlapping_examples),
        help(
            "Positive and negative example sets must be disjoint. \
             Remove the shared individuals from one of the two sets."
        )
    )]
    OverlappingExamples { problem: String, count: usize },
}

// ---------------------------------------------------------------------------
// Pipeline configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read pipeline config: {path}")]
    #[diagnostic(
        code(autocl::config::read),
        help("Check that the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse pipeline config: {path}")]
    #[diagnostic(
        code(autocl::config::parse),
        help("Check the TOML syntax in the pipeline config file.")
    )]
    Parse { path: String, message: String },

    #[error("invalid search-space bounds for {parameter}: min {min} > max {max}")]
    #[diagnostic(
        code(autocl::config::invalid_bounds),
        help("Search-space bounds are inclusive and require min <= max.")
    )]
    InvalidBounds {
        parameter: &'static str,
        min: u64,
        max: u64,
    },

    #[error("search space declares no quality functions")]
    #[diagnostic(
        code(autocl::config::no_quality_funcs),
        help("List at least one of \"f1\", \"accuracy\" under quality_funcs.")
    )]
    NoQualityFuncs,
}

// ---------------------------------------------------------------------------
// Knowledge-base errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum KbError {
    #[error("failed to load ontology: {path}")]
    #[diagnostic(
        code(autocl::kb::load),
        help(
            "Check that the ontology file exists and is valid RDF in the format \
             implied by its extension (.owl/.rdf = RDF/XML, .ttl = Turtle, .nt = N-Triples)."
        )
    )]
    Load { path: String, message: String },

    #[error("unsupported ontology format: {path}")]
    #[diagnostic(
        code(autocl::kb::unsupported_format),
        help("Supported extensions are .owl, .rdf, .xml (RDF/XML), .ttl (Turtle), .nt (N-Triples).")
    )]
    UnsupportedFormat { path: String },

    #[error("failed to save ontology artifact: {path}")]
    #[diagnostic(
        code(autocl::kb::save),
        help("Check write permissions and free disk space in the output directory.")
    )]
    Save { path: String, message: String },

    #[error("SPARQL query error: {message}")]
    #[diagnostic(
        code(autocl::kb::sparql),
        help("The query against the knowledge base failed. This usually indicates a malformed IRI.")
    )]
    Sparql { message: String },

    #[error("invalid individual IRI: {iri}")]
    #[diagnostic(
        code(autocl::kb::invalid_iri),
        help(
            "Individual identifiers in the settings file must be absolute IRIs \
             resolvable against the ontology."
        )
    )]
    InvalidIri { iri: String },
}

// ---------------------------------------------------------------------------
// Learner errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum LearnError {
    #[error("learner produced no hypotheses for \"{concept}\"")]
    #[diagnostic(
        code(autocl::learn::no_hypotheses),
        help(
            "The learner finished without a single candidate concept. \
             Check that the knowledge base still contains classes or properties \
             after feature reduction, and that the training split is non-empty."
        )
    )]
    NoHypotheses { concept: String },

    #[error("training split for \"{concept}\" is empty")]
    #[diagnostic(
        code(autocl::learn::empty_training_split),
        help(
            "Both polarity sets of the training split are empty. \
             The learning problem needs at least a few examples per polarity \
             for a 60/20/20 split to leave training data."
        )
    )]
    EmptyTrainingSplit { concept: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Kb(#[from] KbError),
}

// ---------------------------------------------------------------------------
// Tuner errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum TuneError {
    #[error("trial table is empty: cannot select a best configuration")]
    #[diagnostic(
        code(autocl::tune::empty_table),
        help(
            "Every tuning trial failed or the trial budget was zero. \
             Increase --trials or inspect the trial log for per-trial errors."
        )
    )]
    EmptyTable,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Learn(#[from] LearnError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Kb(#[from] KbError),
}

// ---------------------------------------------------------------------------
// Report errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ReportError {
    #[error("failed to create output directory: {path}")]
    #[diagnostic(
        code(autocl::report::create_dir),
        help("Check that the parent directory exists and you have write permissions.")
    )]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report artifact: {path}")]
    #[diagnostic(
        code(autocl::report::write),
        help("Check write permissions and free disk space in the output directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias for functions returning autocl results.
pub type AutoClResult<T> = std::result::Result<T, AutoClError>;
