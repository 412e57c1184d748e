//! The `examverify init` command.

use std::path::Path;

use anyhow::{Context, Result};

fn write_once(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
    }
    Ok(())
}

pub fn execute() -> Result<()> {
    write_once(Path::new("examverify.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("exam-sets/exams")?;
    write_once(Path::new("exam-sets/reference.toml"), SAMPLE_REFERENCE)?;

    println!("\nNext steps:");
    println!("  1. Fill exam-sets/reference.toml with the published exam's answers");
    println!("  2. Put candidate files (exam-01.json, exam-02.json, ...) in exam-sets/exams");
    println!("  3. Run: examverify verify --reference exam-sets/reference.toml --exams exam-sets/exams");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# examverify configuration

[layout]
slot_count = 15
solve_slots = [4, 5, 6, 7, 8, 9, 10]
template_slots = [8]
candidate_prefix = "exam-"
candidate_suffix = ".json"

[thresholds]
duplicate = 0.01
plus_minus = 0.01
integer_separation = 2.0
decimal_separation = 0.5
cross_slot_leak = 0.5
graph_match = 0.1
small_integer_min_exams = 3
template_min_exams = 3
opening_run = 3
"#;

const SAMPLE_REFERENCE: &str = r#"# Answer key of the published exam.

[exam]
id = "reference"
title = "Published Exam"

[[slots]]
position = 4
section = "B"
kind = "exponential"
prompt = "Solve \\(3^{x} = 81\\)"
answers = [4]

[[slots]]
position = 5
section = "B"
kind = "quadratic"
prompt = "Solve \\(x^2 = 25\\)"
answers = [5, -5]

[[slots]]
position = 8
section = "B"
kind = "rational"
prompt = "Solve \\(\\frac{6}{x-1} = 3\\)"
answers = [3]

[[slots]]
position = 12
section = "C"
kind = "graph-quadratic"
expression = "(x+2)^2 + 5"
vertex = [-2, 5]
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use examverify_core::config::{parse_config_str, VerifierConfig};
    use examverify_core::parser::parse_answer_key_str;

    #[test]
    fn sample_config_is_the_default() {
        let config = parse_config_str(SAMPLE_CONFIG, Path::new("examverify.toml")).unwrap();
        assert_eq!(config, VerifierConfig::default());
    }

    #[test]
    fn sample_reference_parses() {
        let exam = parse_answer_key_str(
            SAMPLE_REFERENCE,
            Path::new("reference.toml"),
            &VerifierConfig::default(),
        )
        .unwrap();
        assert_eq!(exam.slots.len(), 4);
        assert_eq!(exam.slot(5).unwrap().answers.label(), "plus-minus");
    }
}
