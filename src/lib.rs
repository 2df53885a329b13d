//! # autocl
//!
//! Automated ontology-based concept learning: for each learning problem in a
//! dataset, split the labeled individuals, select ontology properties
//! (features) from a concept learner's top-K hypotheses, build a reduced
//! knowledge base, tune learner hyperparameters against the validation
//! split, and evaluate the final learned concept on the held-out test split.
//!
//! ## Architecture
//!
//! - **Knowledge base** (`kb`): file-backed OWL ontologies behind oxigraph,
//!   with copy-based property reduction
//! - **Learner seam** (`learn`): the `ConceptLearner`/`LearnerFactory` traits
//!   plus a bounded refinement baseline
//! - **Tuning** (`tune`): sampler seam, random search, and the trial table
//! - **Pipeline** (`pipeline`): the sequential per-problem orchestration
//!
//! ## Library usage
//!
//! ```no_run
//! use std::path::Path;
//! use autocl::config::PipelineConfig;
//! use autocl::learn::refinement::RefinementFactory;
//! use autocl::pipeline::Pipeline;
//! use autocl::settings::SettingsDoc;
//! use autocl::tune::RandomSampler;
//!
//! let settings_path = Path::new("family.json");
//! let settings = SettingsDoc::load(settings_path).unwrap();
//! let config = PipelineConfig::default();
//! let pipeline = Pipeline::new(&settings, &config, "family").unwrap();
//! let outcomes = pipeline
//!     .run(
//!         &settings.resolved_data_path(settings_path),
//!         &RefinementFactory,
//!         &mut RandomSampler::new(config.seed),
//!     )
//!     .unwrap();
//! ```

pub mod concept;
pub mod config;
pub mod error;
pub mod individual;
pub mod kb;
pub mod learn;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod select;
pub mod settings;
pub mod split;
pub mod tune;
