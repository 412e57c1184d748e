//! SARIF (Static Analysis Results Interchange Format) output.
//!
//! Generates SARIF 2.1.0 documents so findings can surface in code-scanning
//! dashboards next to the exam files that caused them.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

use examverify_core::model::Exam;
use examverify_core::report::VerificationReport;
use examverify_core::results::{Finding, Severity};
use examverify_core::rules::catalogue;

fn level(severity: Severity) -> &'static str {
    match severity {
        Severity::Hard => "error",
        Severity::Warn => "warning",
        Severity::Info => "note",
    }
}

/// Forward-slash form of the file an exam was loaded from.
fn artifact_uri(exams: &[Exam], id: &str) -> Option<String> {
    exams
        .iter()
        .find(|e| e.id == id)
        .filter(|e| !e.source.as_os_str().is_empty())
        .map(|e| e.source.to_string_lossy().replace('\\', "/"))
}

fn locations(finding: &Finding, exams: &[Exam]) -> Vec<serde_json::Value> {
    finding
        .subjects
        .iter()
        .map(|subject| {
            let mut location = json!({});
            if let Some(uri) = artifact_uri(exams, &subject.exam) {
                location["physicalLocation"] = json!({ "artifactLocation": { "uri": uri } });
            }
            if let Some(slot) = subject.slot {
                location["logicalLocations"] = json!([{
                    "name": format!("slot {slot}"),
                    "fullyQualifiedName": format!("{}/slot-{slot}", subject.exam),
                }]);
            }
            location
        })
        .collect()
}

/// Generate a SARIF 2.1.0 JSON document from a verification report.
///
/// `exams` are the exams the report was produced from; their source files
/// become the artifact locations.
pub fn generate_sarif(report: &VerificationReport, exams: &[Exam]) -> serde_json::Value {
    let rules: Vec<serde_json::Value> = catalogue()
        .iter()
        .map(|rule| {
            json!({
                "id": rule.code.as_str(),
                "name": rule.title,
                "shortDescription": { "text": rule.title },
                "defaultConfiguration": { "level": level(rule.severity) },
            })
        })
        .collect();

    let results: Vec<serde_json::Value> = report
        .findings
        .iter()
        .map(|finding| {
            json!({
                "ruleId": finding.code.as_str(),
                "level": level(finding.severity),
                "message": { "text": finding.message },
                "locations": locations(finding, exams),
            })
        })
        .collect();

    json!({
        "$schema": "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/main/sarif-2.1/schema/sarif-schema-2.1.0.json",
        "version": "2.1.0",
        "runs": [{
            "tool": {
                "driver": {
                    "name": "examverify",
                    "version": env!("CARGO_PKG_VERSION"),
                    "informationUri": "https://github.com/MysterionRise/examverify",
                    "rules": rules
                }
            },
            "results": results
        }]
    })
}

/// Write a SARIF report to a file.
pub fn write_sarif_report(report: &VerificationReport, exams: &[Exam], path: &Path) -> Result<()> {
    let sarif = generate_sarif(report, exams);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&sarif)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write SARIF report to {}", path.display()))?;
    Ok(())
}
