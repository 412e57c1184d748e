//! Rule engine orchestrator.
//!
//! Runs every catalogue rule, in catalogue order, over one loaded exam set
//! and collects the findings. Rules never short-circuit each other.

use crate::config::VerifierConfig;
use crate::model::Exam;
use crate::report::VerificationReport;
use crate::results::Finding;
use crate::rules::{catalogue, Rule, RuleContext};

/// Progress reporting trait.
pub trait ProgressReporter {
    fn on_rule_start(&self, rule: &Rule);
    fn on_rule_complete(&self, rule: &Rule, findings: usize);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_rule_start(&self, _: &Rule) {}
    fn on_rule_complete(&self, _: &Rule, _: usize) {}
}

/// The verifier: an immutable configuration plus the rule catalogue.
pub struct Verifier {
    config: VerifierConfig,
}

impl Verifier {
    pub fn new(config: VerifierConfig) -> Self {
        Self { config }
    }

    /// Evaluate every rule over `exams` (reference first, candidates in order).
    pub fn run(&self, exams: &[Exam], progress: &dyn ProgressReporter) -> VerificationReport {
        let ctx = RuleContext::new(exams, &self.config);
        let mut findings: Vec<Finding> = Vec::new();

        for rule in catalogue() {
            progress.on_rule_start(rule);
            let hits = (rule.evaluate)(&ctx);
            tracing::debug!("{} produced {} finding(s)", rule.code, hits.len());
            progress.on_rule_complete(rule, hits.len());
            findings.extend(hits.into_iter().map(|hit| Finding {
                code: rule.code,
                severity: rule.severity,
                message: hit.message,
                subjects: hit.subjects,
            }));
        }

        VerificationReport {
            reference: exams
                .first()
                .filter(|e| e.is_reference)
                .map(|e| e.id.clone()),
            exams: exams.iter().map(|e| e.id.clone()).collect(),
            findings,
        }
    }
}
