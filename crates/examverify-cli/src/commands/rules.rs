//! The `examverify rules` command.

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use examverify_core::results::RuleCode;
use examverify_core::rules::{catalogue, rule, Rule};

/// Print the catalogue, or only the rule named by `code`.
pub fn execute(code: Option<RuleCode>) -> Result<()> {
    let rules: Vec<&Rule> = match code {
        Some(code) => vec![rule(code).with_context(|| format!("{code} is not in the catalogue"))?],
        None => catalogue().iter().collect(),
    };

    let mut table = Table::new();
    table.set_header(vec!["Code", "Severity", "Check"]);

    for rule in rules {
        table.add_row(vec![
            Cell::new(rule.code),
            Cell::new(rule.severity),
            Cell::new(rule.title),
        ]);
    }

    println!("{table}");
    Ok(())
}
