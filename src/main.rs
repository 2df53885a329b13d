//! autocl CLI: ontology-based concept learning experiments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::Result;

use autocl::config::PipelineConfig;
use autocl::kb::KnowledgeBase;
use autocl::learn::refinement::RefinementFactory;
use autocl::pipeline::Pipeline;
use autocl::settings::{self, SettingsDoc};
use autocl::split::split_problem;
use autocl::tune::RandomSampler;

#[derive(Parser)]
#[command(name = "autocl", version, about = "Automated ontology-based concept learning")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline for every learning problem in a settings file.
    Run {
        /// Path to the dataset settings JSON.
        #[arg(long)]
        settings: PathBuf,

        /// Optional pipeline config TOML.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory (overrides config).
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Hyperparameter trial budget per problem (overrides config).
        #[arg(long)]
        trials: Option<usize>,

        /// Top-K hypotheses mined during feature selection (overrides config).
        #[arg(long)]
        top_k: Option<usize>,

        /// RNG seed for reproducible splits and sampling (overrides config).
        #[arg(long)]
        seed: Option<u64>,
    },

    /// List the declared object and data properties of an ontology.
    Properties {
        /// Path to the ontology file.
        #[arg(long)]
        ontology: PathBuf,
    },

    /// Print the 60/20/20 split sizes for each learning problem.
    Split {
        /// Path to the dataset settings JSON.
        #[arg(long)]
        settings: PathBuf,

        /// RNG seed.
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            settings,
            config,
            output_dir,
            trials,
            top_k,
            seed,
        } => {
            let doc = SettingsDoc::load(&settings)?;
            let mut pipeline_config = match config {
                Some(path) => PipelineConfig::load(&path)?,
                None => PipelineConfig::default(),
            };
            if let Some(dir) = output_dir {
                pipeline_config.output_dir = dir;
            }
            if let Some(trials) = trials {
                pipeline_config.trials = trials;
            }
            if let Some(top_k) = top_k {
                pipeline_config.top_k = top_k;
            }
            if let Some(seed) = seed {
                pipeline_config.seed = Some(seed);
            }

            let dataset = settings::dataset_name(&settings);
            let data_path = doc.resolved_data_path(&settings);
            let pipeline = Pipeline::new(&doc, &pipeline_config, &dataset)?;
            let mut sampler = RandomSampler::new(pipeline_config.seed);

            let outcomes = pipeline.run(&data_path, &RefinementFactory, &mut sampler)?;
            for outcome in &outcomes {
                println!(
                    "{}: {} | test F1 {:.4} | test accuracy {:.4} | {}",
                    outcome.problem,
                    outcome.concept,
                    outcome.test_f1,
                    outcome.test_accuracy,
                    outcome.best_config,
                );
            }
            println!(
                "Report written to {}",
                pipeline.reporter().report_path().display()
            );
        }

        Commands::Properties { ontology } => {
            let kb = KnowledgeBase::open(&ontology)?;
            for prop in kb.properties() {
                println!("{}\t{}\t{}", prop.kind, prop.name(), prop.iri());
            }
        }

        Commands::Split { settings, seed } => {
            use rand::SeedableRng;
            let doc = SettingsDoc::load(&settings)?;
            let mut rng = match seed {
                Some(seed) => rand::rngs::StdRng::seed_from_u64(seed),
                None => rand::rngs::StdRng::from_entropy(),
            };
            for (name, spec) in &doc.problems {
                let split = split_problem(
                    &mut rng,
                    spec.positive_examples.iter().cloned().collect(),
                    spec.negative_examples.iter().cloned().collect(),
                );
                println!(
                    "{name}: pos {}/{}/{} neg {}/{}/{} (train/val/test)",
                    split.positive.train.len(),
                    split.positive.validation.len(),
                    split.positive.test.len(),
                    split.negative.train.len(),
                    split.negative.validation.len(),
                    split.negative.test.len(),
                );
            }
        }
    }

    Ok(())
}
