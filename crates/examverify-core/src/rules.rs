//! The rule catalogue.
//!
//! Each rule is a `{code, severity, title, evaluate}` record in an ordered
//! static list. Evaluators only report *hits*; the engine stamps them with
//! the rule's code and severity. Exam pairs are always visited as `(a, b)`
//! with `a` earlier in verification order, so the reference is side "a".

use crate::classify::{
    compare_answers, first_close_component, key_points_match, min_separation,
};
use crate::config::{Layout, Thresholds, VerifierConfig};
use crate::model::{fmt_num, AnswerShape, Exam, GraphKeyPoint};
use crate::normalize::{equation_template, normalize_prompt, opening_direction, Opening};
use crate::results::{RuleCode, Severity, Subject};

/// Input shared by every evaluator.
pub struct RuleContext<'a> {
    /// Reference first (when present), candidates in file-name order.
    pub exams: &'a [Exam],
    pub config: &'a VerifierConfig,
}

impl<'a> RuleContext<'a> {
    pub fn new(exams: &'a [Exam], config: &'a VerifierConfig) -> Self {
        Self { exams, config }
    }

    fn thresholds(&self) -> &Thresholds {
        &self.config.thresholds
    }

    fn layout(&self) -> &Layout {
        &self.config.layout
    }

    fn positions(&self) -> impl Iterator<Item = u8> {
        1..=self.config.layout.slot_count
    }

    /// The reference exam, if one was loaded.
    fn reference(&self) -> Option<&'a Exam> {
        self.exams.first().filter(|e| e.is_reference)
    }

    fn candidates(&self) -> impl Iterator<Item = &'a Exam> {
        self.exams.iter().filter(|e| !e.is_reference)
    }

    /// Every unordered exam pair exactly once, earlier exam first.
    fn pairs(&self) -> impl Iterator<Item = (&'a Exam, &'a Exam)> {
        let exams = self.exams;
        exams
            .iter()
            .enumerate()
            .flat_map(move |(i, a)| exams[i + 1..].iter().map(move |b| (a, b)))
    }
}

/// A rule violation before it is stamped with code and severity.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub message: String,
    pub subjects: Vec<Subject>,
}

impl Hit {
    fn new(message: String, subjects: Vec<Subject>) -> Self {
        Self { message, subjects }
    }
}

pub type Evaluator = fn(&RuleContext<'_>) -> Vec<Hit>;

/// One catalogue entry.
pub struct Rule {
    pub code: RuleCode,
    pub severity: Severity,
    pub title: &'static str,
    pub evaluate: Evaluator,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("code", &self.code)
            .field("severity", &self.severity)
            .field("title", &self.title)
            .finish()
    }
}

static CATALOGUE: [Rule; 12] = [
    Rule {
        code: RuleCode::H1,
        severity: Severity::Hard,
        title: "identical equation text in the same slot",
        evaluate: identical_prompts,
    },
    Rule {
        code: RuleCode::H2,
        severity: Severity::Hard,
        title: "candidate repeats a reference solve answer",
        evaluate: reference_duplicates,
    },
    Rule {
        code: RuleCode::H3,
        severity: Severity::Hard,
        title: "two candidates share a solve answer",
        evaluate: candidate_duplicates,
    },
    Rule {
        code: RuleCode::H4,
        severity: Severity::Hard,
        title: "two solve slots in one candidate share an answer",
        evaluate: within_exam_duplicates,
    },
    Rule {
        code: RuleCode::H5,
        severity: Severity::Hard,
        title: "same vertex or asymptotes in the same graph slot",
        evaluate: graph_duplicates,
    },
    Rule {
        code: RuleCode::W1,
        severity: Severity::Warn,
        title: "answer close to a different reference solve slot",
        evaluate: cross_slot_leaks,
    },
    Rule {
        code: RuleCode::W2,
        severity: Severity::Warn,
        title: "multi-valued component matches the reference answer",
        evaluate: component_matches_reference,
    },
    Rule {
        code: RuleCode::W3,
        severity: Severity::Warn,
        title: "solve answers closer than the minimum separation",
        evaluate: near_duplicates,
    },
    Rule {
        code: RuleCode::W4,
        severity: Severity::Warn,
        title: "± component matches another slot in the same exam",
        evaluate: plus_minus_overlaps,
    },
    Rule {
        code: RuleCode::W5,
        severity: Severity::Warn,
        title: "consecutive exams share a graph opening direction",
        evaluate: opening_runs,
    },
    Rule {
        code: RuleCode::I1,
        severity: Severity::Info,
        title: "small integer answer used across candidates",
        evaluate: small_integer_reuse,
    },
    Rule {
        code: RuleCode::I2,
        severity: Severity::Info,
        title: "repeated equation template",
        evaluate: repeated_templates,
    },
];

/// The ordered rule catalogue.
pub fn catalogue() -> &'static [Rule] {
    &CATALOGUE
}

/// Look up a rule by code.
pub fn rule(code: RuleCode) -> Option<&'static Rule> {
    CATALOGUE.iter().find(|r| r.code == code)
}

fn describe(shape: &AnswerShape) -> String {
    match shape {
        AnswerShape::PlusMinus(a, _) => format!("±{}", fmt_num(a.abs())),
        other => other.to_string(),
    }
}

fn slot_subjects(a: &Exam, b: &Exam, slot: u8) -> Vec<Subject> {
    vec![Subject::new(&a.id, Some(slot)), Subject::new(&b.id, Some(slot))]
}

fn exam_list(exams: &[&Exam]) -> String {
    exams
        .iter()
        .map(|e| e.id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// H-1
fn identical_prompts(ctx: &RuleContext<'_>) -> Vec<Hit> {
    let mut hits = Vec::new();
    for (a, b) in ctx.pairs() {
        for position in ctx.positions() {
            let (Some(sa), Some(sb)) = (a.slot(position), b.slot(position)) else {
                continue;
            };
            let na = normalize_prompt(&sa.prompt);
            if na.is_empty() || na != normalize_prompt(&sb.prompt) {
                continue;
            }
            hits.push(Hit::new(
                format!(
                    "slot {position}: {} and {} have identical equation text",
                    a.id, b.id
                ),
                slot_subjects(a, b, position),
            ));
        }
    }
    hits
}

/// Duplicate solve answers for every pair accepted by `include`.
fn solve_duplicates(ctx: &RuleContext<'_>, include: fn(&Exam, &Exam) -> bool) -> Vec<Hit> {
    let mut hits = Vec::new();
    for (a, b) in ctx.pairs().filter(|(a, b)| include(a, b)) {
        for &position in &ctx.layout().solve_slots {
            let (Some(xa), Some(xb)) = (a.answers(position), b.answers(position)) else {
                continue;
            };
            if compare_answers(xa, xb, ctx.thresholds()).is_duplicate() {
                hits.push(Hit::new(
                    format!(
                        "slot {position}: {} vs {} same answer {}",
                        a.id,
                        b.id,
                        describe(xa)
                    ),
                    slot_subjects(a, b, position),
                ));
            }
        }
    }
    hits
}

/// H-2
fn reference_duplicates(ctx: &RuleContext<'_>) -> Vec<Hit> {
    solve_duplicates(ctx, |a, b| a.is_reference && !b.is_reference)
}

/// H-3
fn candidate_duplicates(ctx: &RuleContext<'_>) -> Vec<Hit> {
    solve_duplicates(ctx, |a, b| !a.is_reference && !b.is_reference)
}

/// H-4
fn within_exam_duplicates(ctx: &RuleContext<'_>) -> Vec<Hit> {
    let floor = ctx.thresholds().duplicate;
    let solve = &ctx.layout().solve_slots;
    let mut hits = Vec::new();
    for exam in ctx.candidates() {
        for (i, &s) in solve.iter().enumerate() {
            let Some(x) = exam.answers(s).and_then(AnswerShape::as_single) else {
                continue;
            };
            for &t in &solve[i + 1..] {
                let Some(y) = exam.answers(t).and_then(AnswerShape::as_single) else {
                    continue;
                };
                if (x - y).abs() < floor {
                    hits.push(Hit::new(
                        format!(
                            "{}: slots {s} and {t} share answer {}",
                            exam.id,
                            fmt_num(x)
                        ),
                        vec![
                            Subject::new(&exam.id, Some(s)),
                            Subject::new(&exam.id, Some(t)),
                        ],
                    ));
                }
            }
        }
    }
    hits
}

fn key_point(exam: &Exam, position: u8) -> Option<&GraphKeyPoint> {
    exam.slot(position)?.graph.as_ref()?.key_point.as_ref()
}

/// H-5
fn graph_duplicates(ctx: &RuleContext<'_>) -> Vec<Hit> {
    let tolerance = ctx.thresholds().graph_match;
    let mut hits = Vec::new();
    for (a, b) in ctx.pairs() {
        for position in ctx.positions() {
            let (Some(ka), Some(kb)) = (key_point(a, position), key_point(b, position)) else {
                continue;
            };
            if key_points_match(ka, kb, tolerance) {
                hits.push(Hit::new(
                    format!("slot {position}: {} vs {} same {ka}", a.id, b.id),
                    slot_subjects(a, b, position),
                ));
            }
        }
    }
    hits
}

/// W-1
fn cross_slot_leaks(ctx: &RuleContext<'_>) -> Vec<Hit> {
    let Some(reference) = ctx.reference() else {
        return Vec::new();
    };
    let tolerance = ctx.thresholds().cross_slot_leak;
    let solve = &ctx.layout().solve_slots;
    let mut hits = Vec::new();
    for exam in ctx.candidates() {
        for &s in solve {
            let Some(ours) = exam.answers(s) else {
                continue;
            };
            for &t in solve.iter().filter(|&&t| t != s) {
                let Some(theirs) = reference.answers(t) else {
                    continue;
                };
                if let Some((x, y)) =
                    first_close_component(&ours.values(), &theirs.values(), tolerance)
                {
                    hits.push(Hit::new(
                        format!(
                            "{} slot {s} answer {} is within {} of {} slot {t} answer {}",
                            exam.id,
                            fmt_num(x),
                            fmt_num(tolerance),
                            reference.id,
                            fmt_num(y)
                        ),
                        vec![
                            Subject::new(&reference.id, Some(t)),
                            Subject::new(&exam.id, Some(s)),
                        ],
                    ));
                }
            }
        }
    }
    hits
}

/// W-2
fn component_matches_reference(ctx: &RuleContext<'_>) -> Vec<Hit> {
    let Some(reference) = ctx.reference() else {
        return Vec::new();
    };
    let floor = ctx.thresholds().duplicate;
    let mut hits = Vec::new();
    for exam in ctx.candidates() {
        for &position in &ctx.layout().solve_slots {
            let Some(ours) = exam.answers(position) else {
                continue;
            };
            if matches!(ours, AnswerShape::Single(_)) {
                continue;
            }
            let Some(y) = reference.answers(position).and_then(AnswerShape::as_single) else {
                continue;
            };
            if let Some((x, _)) = first_close_component(&ours.values(), &[y], floor) {
                hits.push(Hit::new(
                    format!(
                        "slot {position}: {} component {} of {} matches {} answer {}",
                        exam.id,
                        fmt_num(x),
                        describe(ours),
                        reference.id,
                        fmt_num(y)
                    ),
                    slot_subjects(reference, exam, position),
                ));
            }
        }
    }
    hits
}

/// W-3
fn near_duplicates(ctx: &RuleContext<'_>) -> Vec<Hit> {
    let thresholds = ctx.thresholds();
    let mut hits = Vec::new();
    for (a, b) in ctx.pairs() {
        for &position in &ctx.layout().solve_slots {
            let (Some(x), Some(y)) = (
                a.answers(position).and_then(AnswerShape::as_single),
                b.answers(position).and_then(AnswerShape::as_single),
            ) else {
                continue;
            };
            let gap = (x - y).abs();
            let minimum = min_separation(x, y, thresholds);
            if gap >= thresholds.duplicate && gap < minimum {
                hits.push(Hit::new(
                    format!(
                        "slot {position}: {} answer {} vs {} answer {} differ by {} (minimum {})",
                        a.id,
                        fmt_num(x),
                        b.id,
                        fmt_num(y),
                        fmt_num(gap),
                        fmt_num(minimum)
                    ),
                    slot_subjects(a, b, position),
                ));
            }
        }
    }
    hits
}

/// W-4
fn plus_minus_overlaps(ctx: &RuleContext<'_>) -> Vec<Hit> {
    let floor = ctx.thresholds().duplicate;
    let solve = &ctx.layout().solve_slots;
    let mut hits = Vec::new();
    for exam in ctx.exams {
        for &s in solve {
            let Some(pair) = exam.answers(s) else {
                continue;
            };
            if !matches!(pair, AnswerShape::PlusMinus(..)) {
                continue;
            }
            for &t in solve.iter().filter(|&&t| t != s) {
                let Some(y) = exam.answers(t).and_then(AnswerShape::as_single) else {
                    continue;
                };
                if let Some((x, _)) = first_close_component(&pair.values(), &[y], floor) {
                    hits.push(Hit::new(
                        format!(
                            "{}: slot {s} component {} of {} matches slot {t} answer {}",
                            exam.id,
                            fmt_num(x),
                            describe(pair),
                            fmt_num(y)
                        ),
                        vec![
                            Subject::new(&exam.id, Some(s)),
                            Subject::new(&exam.id, Some(t)),
                        ],
                    ));
                }
            }
        }
    }
    hits
}

/// W-5
fn opening_runs(ctx: &RuleContext<'_>) -> Vec<Hit> {
    let min_run = ctx.thresholds().opening_run;
    let mut hits = Vec::new();
    for position in ctx.positions() {
        let directions: Vec<Option<Opening>> = ctx
            .exams
            .iter()
            .map(|e| {
                e.slot(position)
                    .and_then(|s| s.graph.as_ref())
                    .and_then(|g| opening_direction(&g.expression))
            })
            .collect();

        let mut start = 0;
        while start < directions.len() {
            let Some(direction) = directions[start] else {
                start += 1;
                continue;
            };
            let mut end = start + 1;
            while end < directions.len() && directions[end] == Some(direction) {
                end += 1;
            }
            if end - start >= min_run {
                let run: Vec<&Exam> = ctx.exams[start..end].iter().collect();
                hits.push(Hit::new(
                    format!(
                        "slot {position}: {} consecutive exams open {direction} ({})",
                        run.len(),
                        exam_list(&run)
                    ),
                    run.iter()
                        .map(|e| Subject::new(&e.id, Some(position)))
                        .collect(),
                ));
            }
            start = end;
        }
    }
    hits
}

/// I-1
fn small_integer_reuse(ctx: &RuleContext<'_>) -> Vec<Hit> {
    let floor = ctx.thresholds().duplicate;
    let solve = &ctx.layout().solve_slots;
    let mut hits = Vec::new();
    for magnitude in [1.0_f64, 2.0, 3.0] {
        let users: Vec<&Exam> = ctx
            .candidates()
            .filter(|exam| {
                solve.iter().any(|&s| {
                    exam.answers(s).is_some_and(|a| {
                        a.values()
                            .iter()
                            .any(|v| (v.abs() - magnitude).abs() < floor)
                    })
                })
            })
            .collect();
        if users.len() >= ctx.thresholds().small_integer_min_exams {
            hits.push(Hit::new(
                format!(
                    "±{} is a solve answer in {} candidate exams ({})",
                    fmt_num(magnitude),
                    users.len(),
                    exam_list(&users)
                ),
                users.iter().map(|e| Subject::new(&e.id, None)).collect(),
            ));
        }
    }
    hits
}

/// I-2
fn repeated_templates(ctx: &RuleContext<'_>) -> Vec<Hit> {
    let mut hits = Vec::new();
    for &position in &ctx.layout().template_slots {
        // groups in order of first appearance
        let mut groups: Vec<(String, Vec<&Exam>)> = Vec::new();
        for exam in ctx.exams {
            let Some(slot) = exam.slot(position) else {
                continue;
            };
            let template = equation_template(&slot.prompt);
            if template.is_empty() {
                continue;
            }
            match groups.iter_mut().find(|(t, _)| *t == template) {
                Some((_, members)) => members.push(exam),
                None => groups.push((template, vec![exam])),
            }
        }
        for (template, members) in groups {
            if members.len() >= ctx.thresholds().template_min_exams {
                hits.push(Hit::new(
                    format!(
                        "slot {position}: {} exams share equation template {template} ({})",
                        members.len(),
                        exam_list(&members)
                    ),
                    members
                        .iter()
                        .map(|e| Subject::new(&e.id, Some(position)))
                        .collect(),
                ));
            }
        }
    }
    hits
}
