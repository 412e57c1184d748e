//! End-to-end pipeline tests: files on disk → loader → rules → report artifacts.
//!
//! These exercise the library crates the way `examverify verify` does, over
//! exam sets written into temp directories.

use std::path::Path;

use examverify_core::config::VerifierConfig;
use examverify_core::engine::{NoopReporter, Verifier};
use examverify_core::model::Exam;
use examverify_core::parser::load_exam_set;
use examverify_core::report::VerificationReport;
use examverify_core::results::{RuleCode, Severity};
use examverify_report::markdown::to_markdown;
use examverify_report::sarif::generate_sarif;

const REFERENCE: &str = r#"
[exam]
id = "reference"

[[slots]]
position = 5
section = "B"
kind = "quadratic"
prompt = "Solve \\(x^2 = 49\\)"
answers = [7, -7]

[[slots]]
position = 12
section = "C"
kind = "graph-quadratic"
expression = "(x+2)^2 + 5"
vertex = [-2, 5]
"#;

struct Q<'a> {
    pm: &'a str,
    expression: &'a str,
    vertex: (&'a str, &'a str),
}

fn candidate(id: &str, q: &Q<'_>) -> String {
    format!(
        r#"{{
  "id": "{id}",
  "questions": [
    {{"number": 5, "section": "B", "type": "quadratic", "prompt": "Solve for {id}",
      "inputs": [{pm}]}},
    {{"number": 12, "section": "C", "type": "graph-quadratic",
      "prompt": "Graph \\(y = {expr}\\)", "graph": {{"expression": "{expr}"}},
      "inputs": [{{"id": "q12-vertex-x", "type": "numeric", "answer": {vx}}},
                 {{"id": "q12-vertex-y", "type": "numeric", "answer": {vy}}}]}}
  ]
}}"#,
        pm = q.pm,
        expr = q.expression,
        vx = q.vertex.0,
        vy = q.vertex.1,
    )
}

fn pm_inputs(a: &str, b: &str) -> String {
    format!(
        r#"{{"id": "q5-a", "type": "numeric", "answer": {a}}}, {{"id": "q5-b", "type": "numeric", "answer": {b}}}"#
    )
}

fn load(dir: &Path) -> Vec<Exam> {
    load_exam_set(
        &dir.join("reference.toml"),
        &dir.join("exams"),
        &VerifierConfig::default(),
    )
    .unwrap()
}

fn run(dir: &Path) -> VerificationReport {
    Verifier::new(VerifierConfig::default()).run(&load(dir), &NoopReporter)
}

fn write_set(files: &[(&str, String)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("reference.toml"), REFERENCE).unwrap();
    let exams = dir.path().join("exams");
    std::fs::create_dir(&exams).unwrap();
    for (name, content) in files {
        std::fs::write(exams.join(name), content).unwrap();
    }
    dir
}

#[test]
fn sample_set_is_clean() {
    let report = run(Path::new("../../exam-sets"));
    assert_eq!(
        report.exams,
        vec!["reference", "exam-01", "exam-02", "exam-03"]
    );
    assert!(report.findings.is_empty(), "{:#?}", report.findings);

    let sarif = generate_sarif(&report, &load(Path::new("../../exam-sets")));
    assert!(sarif["runs"][0]["results"].as_array().unwrap().is_empty());
    assert!(to_markdown(&report).starts_with("**PASS:** 0 hard"));
}

#[test]
fn plus_minus_and_vertex_duplicates_across_files() {
    let pm_a = pm_inputs("3", "-3");
    let pm_b = pm_inputs("\"-3\"", "\"3\"");
    let dir = write_set(&[
        (
            "exam-01.json",
            candidate(
                "exam-01",
                &Q {
                    pm: &pm_a,
                    expression: "-(x-1)^2 + 3",
                    vertex: ("1", "3"),
                },
            ),
        ),
        (
            "exam-02.json",
            candidate(
                "exam-02",
                &Q {
                    pm: &pm_b,
                    expression: "-(x-1)^2 + 3",
                    vertex: ("1", "3"),
                },
            ),
        ),
    ]);

    let exams = load(dir.path());
    let report = Verifier::new(VerifierConfig::default()).run(&exams, &NoopReporter);
    let hard: Vec<String> = report.hard().iter().map(|f| f.to_string()).collect();
    assert_eq!(
        hard,
        vec![
            "H-1: slot 12: exam-01 and exam-02 have identical equation text",
            "H-3: slot 5: exam-01 vs exam-02 same answer ±3",
            "H-5: slot 12: exam-01 vs exam-02 same vertex (1, 3)",
        ]
    );
    assert_eq!(report.exit_code(), 1);

    let sarif = generate_sarif(&report, &exams);
    let results = sarif["runs"][0]["results"].as_array().unwrap();
    assert_eq!(results.len(), report.findings.len());
    assert!(results.iter().all(|r| r["ruleId"] != "I-1"));
    let uri = results[0]["locations"][1]["physicalLocation"]["artifactLocation"]["uri"]
        .as_str()
        .unwrap();
    assert!(uri.ends_with("exams/exam-02.json"), "{uri}");
}

#[test]
fn opening_run_is_a_warning() {
    let pm_a = pm_inputs("9", "-9");
    let pm_b = pm_inputs("11", "-11");
    let dir = write_set(&[
        (
            "exam-01.json",
            candidate(
                "exam-01",
                &Q {
                    pm: &pm_a,
                    expression: "(x-4)^2 + 1",
                    vertex: ("4", "1"),
                },
            ),
        ),
        (
            "exam-02.json",
            candidate(
                "exam-02",
                &Q {
                    pm: &pm_b,
                    expression: "2(x+6)^2 - 3",
                    vertex: ("-6", "-3"),
                },
            ),
        ),
    ]);

    let report = run(dir.path());
    assert!(!report.is_blocked(), "{:#?}", report.hard());
    let warnings = report.by_severity(Severity::Warn);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].code, RuleCode::W5);
    assert_eq!(
        warnings[0].message,
        "slot 12: 3 consecutive exams open up (reference, exam-01, exam-02)"
    );
}

#[test]
fn file_order_does_not_matter() {
    let pm_a = pm_inputs("9", "-9");
    let pm_b = pm_inputs("7", "-7");
    let a = candidate(
        "exam-01",
        &Q {
            pm: &pm_a,
            expression: "-(x-1)^2 + 3",
            vertex: ("1", "3"),
        },
    );
    let b = candidate(
        "exam-02",
        &Q {
            pm: &pm_b,
            expression: "-(x-5)^2",
            vertex: ("5", "0"),
        },
    );

    let forward = write_set(&[("exam-01.json", a.clone()), ("exam-02.json", b.clone())]);
    let backward = write_set(&[("exam-02.json", b), ("exam-01.json", a)]);

    let first = run(forward.path());
    let second = run(backward.path());
    assert_eq!(first, second);
    assert_eq!(
        first.hard()[0].to_string(),
        "H-2: slot 5: reference vs exam-02 same answer ±7"
    );
}
