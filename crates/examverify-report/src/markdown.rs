//! Markdown report, for pull-request comments and CI summaries.

use examverify_core::report::VerificationReport;
use examverify_core::results::Severity;

/// Escape characters that would break a table cell.
fn cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

/// Format a verification report as markdown.
pub fn to_markdown(report: &VerificationReport) -> String {
    let mut md = String::new();

    let verdict = if report.is_blocked() { "BLOCKED" } else { "PASS" };
    md.push_str(&format!(
        "**{verdict}:** {} hard, {} warnings, {} info across {} exams\n\n",
        report.hard().len(),
        report.warnings().len(),
        report.infos().len(),
        report.exams.len()
    ));

    let tally = report.tally();
    if !tally.is_empty() {
        md.push_str("| Rule | Severity | Findings |\n");
        md.push_str("|------|----------|----------|\n");
        for t in &tally {
            md.push_str(&format!("| {} | {} | {} |\n", t.code, t.severity, t.count));
        }
        md.push('\n');
    }

    for (title, severity) in [
        ("Hard failures", Severity::Hard),
        ("Warnings", Severity::Warn),
        ("Info", Severity::Info),
    ] {
        let bucket = report.by_severity(severity);
        if bucket.is_empty() {
            continue;
        }
        md.push_str(&format!("### {title}\n\n"));
        md.push_str("| Rule | Finding |\n");
        md.push_str("|------|---------|\n");
        for f in bucket {
            md.push_str(&format!("| {} | {} |\n", f.code, cell(&f.message)));
        }
        md.push('\n');
    }

    md
}
