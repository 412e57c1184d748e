//! The `examverify verify` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use examverify_core::config::load_config_from;
use examverify_core::engine::{NoopReporter, ProgressReporter, Verifier};
use examverify_core::model::Exam;
use examverify_core::parser::load_exam_set;
use examverify_core::report::VerificationReport;
use examverify_core::rules::Rule;
use examverify_report::markdown::to_markdown;
use examverify_report::sarif::{generate_sarif, write_sarif_report};

use crate::OutputFormat;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_rule_start(&self, rule: &Rule) {
        eprintln!("  Checking {} ({})", rule.code, rule.title);
    }

    fn on_rule_complete(&self, rule: &Rule, findings: usize) {
        eprintln!("  Done: {} [{}] {findings} finding(s)", rule.code, rule.severity);
    }
}

fn render(report: &VerificationReport, format: OutputFormat, exams: &[Exam]) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => report.to_text(),
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
        OutputFormat::Markdown => to_markdown(report),
        OutputFormat::Sarif => serde_json::to_string_pretty(&generate_sarif(report, exams))?,
    })
}

/// Run the verifier and return the process exit code.
///
/// Without `--output` the chosen format goes to stdout. With `--output` the
/// text report goes to stdout and the artifact to the file.
pub fn execute(
    reference: PathBuf,
    exams_dir: PathBuf,
    config_path: Option<PathBuf>,
    format: OutputFormat,
    output: Option<PathBuf>,
    verbose: bool,
) -> Result<i32> {
    let config = load_config_from(config_path.as_deref())?;
    let exams = load_exam_set(&reference, &exams_dir, &config)?;

    let verifier = Verifier::new(config);
    let report = if verbose {
        verifier.run(&exams, &ConsoleReporter)
    } else {
        verifier.run(&exams, &NoopReporter)
    };

    match output {
        Some(path) => {
            print!("{}", report.to_text());
            match format {
                OutputFormat::Json => report.save_json(&path)?,
                OutputFormat::Sarif => write_sarif_report(&report, &exams, &path)?,
                OutputFormat::Text | OutputFormat::Markdown => {
                    let artifact = render(&report, format, &exams)?;
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, artifact)
                        .with_context(|| format!("failed to write report to {}", path.display()))?;
                }
            }
            tracing::info!("report written to {}", path.display());
        }
        None => {
            let rendered = render(&report, format, &exams)?;
            if rendered.ends_with('\n') {
                print!("{rendered}");
            } else {
                println!("{rendered}");
            }
        }
    }

    tracing::info!(
        "{} hard, {} warning(s), {} info",
        report.hard().len(),
        report.warnings().len(),
        report.infos().len()
    );

    Ok(report.exit_code())
}
