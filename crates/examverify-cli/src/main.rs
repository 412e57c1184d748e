//! examverify CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use examverify_core::results::RuleCode;

mod commands;

#[derive(Parser)]
#[command(
    name = "examverify",
    version,
    about = "Cross-exam answer uniqueness verifier"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Artifact format written to `--output`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
    Sarif,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify candidate exams against the reference and each other
    Verify {
        /// Reference answer key (.toml) or reference exam (.json)
        #[arg(long)]
        reference: PathBuf,

        /// Directory holding candidate exam files
        #[arg(long)]
        exams: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Artifact format written to --output
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Artifact path (stdout gets the text report regardless)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print per-rule progress on stderr
        #[arg(long, short)]
        verbose: bool,
    },

    /// List the rule catalogue
    Rules {
        /// Show only this rule (e.g. W-3)
        code: Option<RuleCode>,
    },

    /// Show how one exam file is normalized
    Inspect {
        /// Exam JSON or reference TOML
        #[arg(long)]
        exam: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and sample reference key
    Init,
}

fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("examverify=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Verify {
            reference,
            exams,
            config,
            format,
            output,
            verbose,
        } => commands::verify::execute(reference, exams, config, format, output, verbose),
        Commands::Rules { code } => commands::rules::execute(code).map(|()| 0),
        Commands::Inspect { exam, config } => commands::inspect::execute(exam, config).map(|()| 0),
        Commands::Init => commands::init::execute().map(|()| 0),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            if let Some(load) = e.downcast_ref::<examverify_core::error::LoadError>() {
                tracing::debug!("load failure, malformed input: {}", load.is_malformed());
            }
            eprintln!("Error: {e:#}");
            process::exit(2);
        }
    }
}
