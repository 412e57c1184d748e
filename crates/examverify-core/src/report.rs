//! Verification report with severity buckets, console rendering and JSON persistence.
//!
//! The report carries no timestamps or run ids, so re-running over the same
//! exams yields byte-identical output.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::results::{Finding, RuleCode, Severity};

/// All findings of one verification run, in discovery order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Id of the reference exam, if one was loaded.
    pub reference: Option<String>,
    /// Exam ids in verification order.
    pub exams: Vec<String>,
    pub findings: Vec<Finding>,
}

/// Number of findings per rule code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTally {
    pub code: RuleCode,
    pub severity: Severity,
    pub count: usize,
}

impl VerificationReport {
    /// Findings of one severity, in discovery order.
    pub fn by_severity(&self, severity: Severity) -> Vec<&Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .collect()
    }

    pub fn hard(&self) -> Vec<&Finding> {
        self.by_severity(Severity::Hard)
    }

    pub fn warnings(&self) -> Vec<&Finding> {
        self.by_severity(Severity::Warn)
    }

    pub fn infos(&self) -> Vec<&Finding> {
        self.by_severity(Severity::Info)
    }

    /// Returns true if any hard finding exists.
    pub fn is_blocked(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Hard)
    }

    /// Process exit status: 1 when blocked, 0 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_blocked() {
            1
        } else {
            0
        }
    }

    /// Per-code counts for codes that fired, in catalogue order.
    pub fn tally(&self) -> Vec<RuleTally> {
        RuleCode::ALL
            .into_iter()
            .filter_map(|code| {
                let hits: Vec<&Finding> =
                    self.findings.iter().filter(|f| f.code == code).collect();
                hits.first().map(|first| RuleTally {
                    code,
                    severity: first.severity,
                    count: hits.len(),
                })
            })
            .collect()
    }

    /// Render the console report.
    pub fn to_text(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "Verified {} exam(s), reference: {}\n",
            self.exams.len(),
            self.reference.as_deref().unwrap_or("none")
        ));

        for (title, severity) in [
            ("HARD FAILURES", Severity::Hard),
            ("WARNINGS", Severity::Warn),
            ("INFO", Severity::Info),
        ] {
            let bucket = self.by_severity(severity);
            out.push_str(&format!("\n{title} ({})\n", bucket.len()));
            for finding in bucket {
                out.push_str(&format!("{finding}\n"));
            }
        }

        let hard = self.hard().len();
        if hard > 0 {
            out.push_str(&format!("\nBLOCKED: {hard} hard finding(s)\n"));
        } else {
            out.push_str(&format!(
                "\nPASS: 0 hard, {} warning(s), {} info\n",
                self.warnings().len(),
                self.infos().len()
            ));
        }
        out
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }
}
