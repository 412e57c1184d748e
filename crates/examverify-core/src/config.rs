//! Verifier configuration.
//!
//! Thresholds and slot layout are an immutable value handed to the engine.
//! Loaded from `examverify.toml`; every field falls back to a default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Equivalence floors and warning-tier separations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Two values closer than this are the same answer.
    pub duplicate: f64,
    /// A pair whose sum is within this of zero is a ± pair.
    pub plus_minus: f64,
    /// Minimum separation for integer-typed singleton answers.
    pub integer_separation: f64,
    /// Minimum separation for decimal-typed singleton answers.
    pub decimal_separation: f64,
    /// Cross-slot closeness against the reference exam (W-1).
    pub cross_slot_leak: f64,
    /// Per-axis tolerance for vertex and asymptote matches.
    pub graph_match: f64,
    /// Candidate exams sharing a small integer before I-1 fires.
    pub small_integer_min_exams: usize,
    /// Exams sharing a template before I-2 fires.
    pub template_min_exams: usize,
    /// Consecutive exams with the same opening direction before W-5 fires.
    pub opening_run: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            duplicate: 0.01,
            plus_minus: 0.01,
            integer_separation: 2.0,
            decimal_separation: 0.5,
            cross_slot_leak: 0.5,
            graph_match: 0.1,
            small_integer_min_exams: 3,
            template_min_exams: 3,
            opening_run: 3,
        }
    }
}

/// Which positions mean what, and how candidate files are named.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Number of canonical question positions.
    pub slot_count: u8,
    /// B-section numeric positions checked for duplicate answers.
    pub solve_slots: Vec<u8>,
    /// Positions checked for repeated equation templates (I-2).
    pub template_slots: Vec<u8>,
    /// Candidate file name prefix before the sequence number.
    pub candidate_prefix: String,
    /// Candidate file name suffix after the sequence number.
    pub candidate_suffix: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            slot_count: 15,
            solve_slots: vec![4, 5, 6, 7, 8, 9, 10],
            template_slots: vec![8],
            candidate_prefix: "exam-".to_string(),
            candidate_suffix: ".json".to_string(),
        }
    }
}

impl Layout {
    pub fn is_solve_slot(&self, position: u8) -> bool {
        self.solve_slots.contains(&position)
    }

    /// Returns `true` if `name` is `<prefix><digits><suffix>`.
    pub fn matches_candidate(&self, name: &str) -> bool {
        name.strip_prefix(self.candidate_prefix.as_str())
            .and_then(|rest| rest.strip_suffix(self.candidate_suffix.as_str()))
            .is_some_and(|seq| !seq.is_empty() && seq.chars().all(|c| c.is_ascii_digit()))
    }
}

/// Top-level examverify configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    pub layout: Layout,
    pub thresholds: Thresholds,
}

impl VerifierConfig {
    /// Check that thresholds are usable and configured slots exist.
    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        for (name, value) in [
            ("duplicate", t.duplicate),
            ("plus_minus", t.plus_minus),
            ("integer_separation", t.integer_separation),
            ("decimal_separation", t.decimal_separation),
            ("cross_slot_leak", t.cross_slot_leak),
            ("graph_match", t.graph_match),
        ] {
            anyhow::ensure!(
                value.is_finite() && value > 0.0,
                "threshold '{name}' must be a positive number, got {value}"
            );
        }
        anyhow::ensure!(
            t.opening_run >= 2,
            "threshold 'opening_run' must be at least 2"
        );

        let layout = &self.layout;
        anyhow::ensure!(layout.slot_count >= 1, "slot_count must be at least 1");
        for &slot in layout.solve_slots.iter().chain(&layout.template_slots) {
            anyhow::ensure!(
                (1..=layout.slot_count).contains(&slot),
                "configured slot {slot} is outside 1..={}",
                layout.slot_count
            );
        }
        anyhow::ensure!(
            !layout.candidate_suffix.is_empty() || !layout.candidate_prefix.is_empty(),
            "candidate file pattern needs a prefix or a suffix"
        );
        Ok(())
    }
}

/// Parse a TOML string into a validated config.
pub fn parse_config_str(content: &str, source_path: &Path) -> Result<VerifierConfig> {
    let config: VerifierConfig = toml::from_str(content)
        .with_context(|| format!("failed to parse config: {}", source_path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config: {}", source_path.display()))?;
    Ok(config)
}

/// Load config from an explicit path, or `./examverify.toml`, or defaults.
pub fn load_config_from(path: Option<&Path>) -> Result<VerifierConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("examverify.toml");
            local.exists().then_some(local)
        }
    };

    match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            tracing::debug!("using config {}", path.display());
            parse_config_str(&content, &path)
        }
        None => Ok(VerifierConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = VerifierConfig::default();
        config.validate().unwrap();
        assert_eq!(config.layout.slot_count, 15);
        assert_eq!(config.thresholds.duplicate, 0.01);
        assert!(config.layout.is_solve_slot(4));
        assert!(!config.layout.is_solve_slot(12));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let toml_str = r#"
[layout]
solve_slots = [4, 5, 6]

[thresholds]
integer_separation = 3.0
"#;
        let config = parse_config_str(toml_str, Path::new("examverify.toml")).unwrap();
        assert_eq!(config.layout.solve_slots, vec![4, 5, 6]);
        assert_eq!(config.layout.candidate_prefix, "exam-");
        assert_eq!(config.thresholds.integer_separation, 3.0);
        assert_eq!(config.thresholds.decimal_separation, 0.5);
    }

    #[test]
    fn rejects_bad_thresholds_and_slots() {
        let negative = "[thresholds]\nduplicate = -0.5\n";
        assert!(parse_config_str(negative, Path::new("x.toml")).is_err());

        let out_of_range = "[layout]\nsolve_slots = [4, 16]\n";
        let err = parse_config_str(out_of_range, Path::new("x.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("outside"));
    }

    #[test]
    fn candidate_name_pattern() {
        let layout = Layout::default();
        assert!(layout.matches_candidate("exam-01.json"));
        assert!(layout.matches_candidate("exam-12.json"));
        assert!(!layout.matches_candidate("exam-.json"));
        assert!(!layout.matches_candidate("exam-01.json.bak"));
        assert!(!layout.matches_candidate("exam-draft.json"));
        assert!(!layout.matches_candidate("reference.json"));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let err = load_config_from(Some(Path::new("/no/such/examverify.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("examverify.toml");
        std::fs::write(&path, "[layout]\ncandidate_prefix = \"practice-\"\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert!(config.layout.matches_candidate("practice-3.json"));
    }
}
