//! Pipeline configuration, persisted as TOML.
//!
//! Every field has a default, so a config file only needs to state what it
//! overrides. CLI flags override file values in turn (handled in `main`).
//!
//! ```toml
//! output_dir = "runs/family"
//! trials = 100
//! top_k = 10
//! seed = 42
//!
//! [search_space]
//! max_runtime_secs = { min = 1, max = 60 }
//! quality_funcs = ["f1"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tune::SearchSpace;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Run-wide pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory for reports and artifacts, created at startup.
    pub output_dir: PathBuf,
    /// Hyperparameter trial budget per learning problem.
    pub trials: usize,
    /// Top-K hypotheses mined during feature selection.
    pub top_k: usize,
    /// RNG seed for splits and sampling. `None` draws from entropy, making
    /// runs non-reproducible.
    pub seed: Option<u64>,
    /// Hyperparameter search space.
    pub search_space: SearchSpace,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("autocl-out"),
            trials: 100,
            top_k: 10,
            seed: None,
            search_space: SearchSpace::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: PipelineConfig = toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.search_space.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learn::QualityFunction;
    use crate::tune::Bounds;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = PipelineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.trials, 100);
        assert_eq!(config.top_k, 10);
        assert!(config.seed.is_none());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("pipeline.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(
            br#"
trials = 5
seed = 42

[search_space]
max_runtime_secs = { min = 1, max = 2 }
quality_funcs = ["f1"]
"#,
        )
        .unwrap();

        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.trials, 5);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.top_k, 10);
        assert_eq!(config.search_space.max_runtime_secs, Bounds::new(1, 2));
        assert_eq!(config.search_space.quality_funcs, vec![QualityFunction::F1]);
        // Unstated bounds keep their defaults.
        assert_eq!(
            config.search_space.iter_bound,
            SearchSpace::default().iter_bound
        );
    }

    #[test]
    fn invalid_bounds_fail_at_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("pipeline.toml");
        std::fs::write(
            &path,
            "[search_space]\nmax_runtime_secs = { min = 9, max = 3 }\n",
        )
        .unwrap();
        assert!(matches!(
            PipelineConfig::load(&path),
            Err(ConfigError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("pipeline.toml");
        std::fs::write(&path, "trials = [not toml").unwrap();
        assert!(matches!(
            PipelineConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
