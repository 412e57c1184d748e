//! Finding types produced by the rule engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks publication.
    Hard,
    Warn,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Hard => write!(f, "hard"),
            Severity::Warn => write!(f, "warn"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Catalogue code of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleCode {
    #[serde(rename = "H-1")]
    H1,
    #[serde(rename = "H-2")]
    H2,
    #[serde(rename = "H-3")]
    H3,
    #[serde(rename = "H-4")]
    H4,
    #[serde(rename = "H-5")]
    H5,
    #[serde(rename = "W-1")]
    W1,
    #[serde(rename = "W-2")]
    W2,
    #[serde(rename = "W-3")]
    W3,
    #[serde(rename = "W-4")]
    W4,
    #[serde(rename = "W-5")]
    W5,
    #[serde(rename = "I-1")]
    I1,
    #[serde(rename = "I-2")]
    I2,
}

impl RuleCode {
    /// Every code, in catalogue order.
    pub const ALL: [RuleCode; 12] = [
        RuleCode::H1,
        RuleCode::H2,
        RuleCode::H3,
        RuleCode::H4,
        RuleCode::H5,
        RuleCode::W1,
        RuleCode::W2,
        RuleCode::W3,
        RuleCode::W4,
        RuleCode::W5,
        RuleCode::I1,
        RuleCode::I2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCode::H1 => "H-1",
            RuleCode::H2 => "H-2",
            RuleCode::H3 => "H-3",
            RuleCode::H4 => "H-4",
            RuleCode::H5 => "H-5",
            RuleCode::W1 => "W-1",
            RuleCode::W2 => "W-2",
            RuleCode::W3 => "W-3",
            RuleCode::W4 => "W-4",
            RuleCode::W5 => "W-5",
            RuleCode::I1 => "I-1",
            RuleCode::I2 => "I-2",
        }
    }
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        RuleCode::ALL
            .into_iter()
            .find(|code| code.as_str() == wanted)
            .ok_or_else(|| format!("unknown rule code: {s}"))
    }
}

/// An exam (and optionally a slot) involved in a finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub exam: String,
    #[serde(default)]
    pub slot: Option<u8>,
}

impl Subject {
    pub fn new(exam: &str, slot: Option<u8>) -> Self {
        Self {
            exam: exam.to_string(),
            slot,
        }
    }
}

/// One reported rule violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub code: RuleCode,
    pub severity: Severity,
    pub message: String,
    /// Exams and slots involved; side "a" first.
    pub subjects: Vec<Subject>,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}
