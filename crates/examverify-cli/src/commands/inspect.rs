//! The `examverify inspect` command.

use std::path::PathBuf;

use anyhow::Result;

use examverify_core::config::load_config_from;
use examverify_core::normalize::{equation_template, normalize_prompt, opening_direction};
use examverify_core::parser;

pub fn execute(exam_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let exam = if exam_path.extension().is_some_and(|ext| ext == "toml") {
        parser::load_reference(&exam_path, &config)?
    } else {
        parser::parse_exam(&exam_path, &config)?
    };

    let header = if exam.title.is_empty() {
        exam.id.clone()
    } else {
        format!("{} ({})", exam.id, exam.title)
    };
    println!("Exam: {header}, {} slot(s)", exam.slots.len());

    for slot in &exam.slots {
        let mut line = format!(
            "  {:>2} {} {:<16} {:<9} {}",
            slot.position,
            slot.section,
            slot.kind,
            slot.answers.label(),
            slot.answers
        );
        if config.layout.is_solve_slot(slot.position) {
            line.push_str(" solve-slot");
        }
        if let Some(choice) = &slot.choice {
            line.push_str(&format!(" choice={choice}"));
        }
        if let Some(graph) = &slot.graph {
            if let Some(point) = &graph.key_point {
                line.push_str(&format!(" {point}"));
            }
            if let Some(dir) = opening_direction(&graph.expression) {
                line.push_str(&format!(" opens {dir}"));
            }
        }
        println!("{}", line.trim_end());

        let normalized = normalize_prompt(&slot.prompt);
        if !normalized.is_empty() {
            println!("       {normalized}");
            if config.layout.template_slots.contains(&slot.position) {
                println!("       template {}", equation_template(&slot.prompt));
            }
        }
    }

    Ok(())
}
