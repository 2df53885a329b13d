//! Run reporting: the append-only per-dataset report file and artifact
//! path management under the output directory.
//!
//! The report file is a human log, not machine-parseable; structured data
//! goes to the per-problem CSV and predictions artifacts instead.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::ReportError;
use crate::learn::Hypothesis;
use crate::pipeline::ProblemOutcome;
use crate::tune::TrialRow;

pub type ReportResult<T> = std::result::Result<T, ReportError>;

/// Writes stage records for one dataset run.
#[derive(Debug, Clone)]
pub struct RunReporter {
    output_dir: PathBuf,
    report_path: PathBuf,
}

impl RunReporter {
    /// Bind a reporter to `<output_dir>/<dataset>_report.txt`, creating the
    /// output directory. A failure to create it is a hard error: every
    /// downstream artifact depends on it.
    pub fn new(output_dir: &Path, dataset: &str) -> ReportResult<Self> {
        std::fs::create_dir_all(output_dir).map_err(|source| ReportError::CreateDir {
            path: output_dir.display().to_string(),
            source,
        })?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            report_path: output_dir.join(format!("{dataset}_report.txt")),
        })
    }

    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    /// Per-problem reduced-ontology artifact path.
    pub fn reduced_kb_path(&self, problem: &str) -> PathBuf {
        self.output_dir
            .join(format!("reduced_{}.ttl", sanitize(problem)))
    }

    /// Per-problem predictions (top hypotheses) artifact path.
    pub fn predictions_path(&self, problem: &str) -> PathBuf {
        self.output_dir
            .join(format!("predictions_{}.txt", sanitize(problem)))
    }

    /// Per-problem trial-table CSV path.
    pub fn trials_csv_path(&self, problem: &str) -> PathBuf {
        self.output_dir
            .join(format!("trials_{}.csv", sanitize(problem)))
    }

    fn append(&self, text: &str) -> ReportResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.report_path)
            .map_err(|source| ReportError::Write {
                path: self.report_path.display().to_string(),
                source,
            })?;
        file.write_all(text.as_bytes())
            .map_err(|source| ReportError::Write {
                path: self.report_path.display().to_string(),
                source,
            })
    }

    /// Record the hypotheses considered during feature selection.
    pub fn log_hypotheses(&self, problem: &str, hypotheses: &[Hypothesis]) -> ReportResult<()> {
        let mut text = format!("Top {} hypotheses for {problem}:\n", hypotheses.len());
        for hypothesis in hypotheses {
            text.push_str(&format!("Concept: {hypothesis}\n"));
        }
        self.append(&text)
    }

    /// Record the winning trial row.
    pub fn log_best_trial(&self, row: &TrialRow) -> ReportResult<()> {
        self.append(&format!(
            "Best trial for {}: {} | validation F1 {:.4} | validation accuracy {:.4}\n",
            row.problem, row.config, row.validation_f1, row.validation_accuracy
        ))
    }

    /// Record the final evaluation block for one learning problem.
    pub fn log_outcome(&self, outcome: &ProblemOutcome) -> ReportResult<()> {
        let text = format!(
            "Learning Problem: {}\n\
             Concept Generated After Feature Selection: {}\n\
             Quality Score: {:.4}\n\
             F1 Score: {:.4}\n\
             Accuracy: {:.4}\n\
             Selected Features: {}\n\
             Best Hyperparameters: {}\n\
             Time Taken: {:.2}s\n\
             Time Taken (final fit): {:.2}s\n\
             ----------------------------\n",
            outcome.problem,
            outcome.concept,
            outcome.quality,
            outcome.test_f1,
            outcome.test_accuracy,
            outcome
                .selected_features
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
            outcome.best_config,
            outcome.elapsed.as_secs_f64(),
            outcome.final_stage_elapsed.as_secs_f64(),
        );
        self.append(&text)
    }

    /// Overwrite the per-problem predictions artifact with the given
    /// hypotheses, rendered one per line.
    pub fn write_predictions(&self, problem: &str, hypotheses: &[Hypothesis]) -> ReportResult<()> {
        let path = self.predictions_path(problem);
        let mut text = String::new();
        for hypothesis in hypotheses {
            text.push_str(&format!("{hypothesis}\n"));
        }
        std::fs::write(&path, text).map_err(|source| ReportError::Write {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Replace path-hostile characters in a problem name.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concept::ClassExpression;

    #[test]
    fn creates_output_dir_and_report_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("nested/run");
        let reporter = RunReporter::new(&out, "family").unwrap();
        assert!(out.is_dir());
        assert!(reporter.report_path().ends_with("family_report.txt"));
    }

    #[test]
    fn appends_across_calls() {
        let dir = tempfile::TempDir::new().unwrap();
        let reporter = RunReporter::new(dir.path(), "family").unwrap();
        let hypo = Hypothesis {
            expression: ClassExpression::class("http://e.org#Female"),
            quality: 1.0,
        };
        reporter.log_hypotheses("Aunt", &[hypo.clone()]).unwrap();
        reporter.log_hypotheses("Uncle", &[hypo]).unwrap();

        let text = std::fs::read_to_string(reporter.report_path()).unwrap();
        assert!(text.contains("Aunt"));
        assert!(text.contains("Uncle"));
        assert!(text.contains("Female"));
    }

    #[test]
    fn artifact_names_are_sanitized_per_problem() {
        let dir = tempfile::TempDir::new().unwrap();
        let reporter = RunReporter::new(dir.path(), "family").unwrap();
        let path = reporter.reduced_kb_path("Aunt (v2)");
        assert!(path.ends_with("reduced_Aunt__v2_.ttl"));
        assert_ne!(
            reporter.predictions_path("A"),
            reporter.predictions_path("B")
        );
    }

    #[test]
    fn write_predictions_overwrites() {
        let dir = tempfile::TempDir::new().unwrap();
        let reporter = RunReporter::new(dir.path(), "family").unwrap();
        let first = Hypothesis {
            expression: ClassExpression::class("http://e.org#A"),
            quality: 0.5,
        };
        let second = Hypothesis {
            expression: ClassExpression::class("http://e.org#B"),
            quality: 0.9,
        };
        reporter.write_predictions("C", &[first]).unwrap();
        reporter.write_predictions("C", &[second]).unwrap();

        let text = std::fs::read_to_string(reporter.predictions_path("C")).unwrap();
        assert!(!text.contains('A'));
        assert!(text.contains('B'));
    }
}
