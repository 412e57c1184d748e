//! Core data model types for examverify.
//!
//! An [`Exam`] is an identifier plus up to `slot_count` [`QuestionSlot`]s.
//! Every slot keeps its answers in tagged form ([`AnswerShape`]) so the rules
//! branch on the shape rather than on array lengths.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Exam section a slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    /// Conceptual identification.
    A,
    /// Equation solving.
    B,
    /// Graph analysis.
    C,
    /// Applied / word problem.
    D,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::A => write!(f, "A"),
            Section::B => write!(f, "B"),
            Section::C => write!(f, "C"),
            Section::D => write!(f, "D"),
        }
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(Section::A),
            "B" => Ok(Section::B),
            "C" => Ok(Section::C),
            "D" => Ok(Section::D),
            other => Err(format!("unknown section: {other}")),
        }
    }
}

/// Numeric answers of a slot, classified by shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "values", rename_all = "snake_case")]
pub enum AnswerShape {
    /// No numeric answers.
    None,
    /// One value.
    Single(f64),
    /// Two values that are additive inverses, in source order.
    PlusMinus(f64, f64),
    /// Two values that are not additive inverses, in source order.
    Unordered(f64, f64),
    /// Three or more values, in source order.
    Multi(Vec<f64>),
}

impl AnswerShape {
    /// Classify a list of numeric answers.
    ///
    /// A pair whose sum is within `plus_minus_tolerance` of zero is a ± pair.
    pub fn classify(values: &[f64], plus_minus_tolerance: f64) -> Self {
        match values {
            [] => AnswerShape::None,
            [x] => AnswerShape::Single(*x),
            [a, b] if (a + b).abs() < plus_minus_tolerance => AnswerShape::PlusMinus(*a, *b),
            [a, b] => AnswerShape::Unordered(*a, *b),
            many => AnswerShape::Multi(many.to_vec()),
        }
    }

    /// All values in source order.
    pub fn values(&self) -> Vec<f64> {
        match self {
            AnswerShape::None => Vec::new(),
            AnswerShape::Single(x) => vec![*x],
            AnswerShape::PlusMinus(a, b) | AnswerShape::Unordered(a, b) => vec![*a, *b],
            AnswerShape::Multi(v) => v.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, AnswerShape::None)
    }

    pub fn as_single(&self) -> Option<f64> {
        match self {
            AnswerShape::Single(x) => Some(*x),
            _ => None,
        }
    }

    /// Short label used by `inspect`.
    pub fn label(&self) -> &'static str {
        match self {
            AnswerShape::None => "none",
            AnswerShape::Single(_) => "single",
            AnswerShape::PlusMinus(..) => "plus-minus",
            AnswerShape::Unordered(..) => "unordered-pair",
            AnswerShape::Multi(_) => "multi",
        }
    }
}

impl fmt::Display for AnswerShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerShape::None => write!(f, "-"),
            AnswerShape::Single(x) => write!(f, "{}", fmt_num(*x)),
            AnswerShape::PlusMinus(a, b) | AnswerShape::Unordered(a, b) => {
                write!(f, "[{}, {}]", fmt_num(*a), fmt_num(*b))
            }
            AnswerShape::Multi(v) => {
                let parts: Vec<String> = v.iter().map(|x| fmt_num(*x)).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// Format a number without trailing noise (`2` rather than `2.0`).
pub fn fmt_num(x: f64) -> String {
    let rounded = (x * 1e4).round() / 1e4;
    // `-0.00001` rounds to `-0.0`
    let x = if rounded == 0.0 { 0.0 } else { x };
    if x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{}", x as i64)
    } else {
        let s = format!("{x:.4}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// The distinguishing point of a rendered graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GraphKeyPoint {
    Vertex { x: f64, y: f64 },
    Asymptotes { vertical: f64, horizontal: f64 },
}

impl fmt::Display for GraphKeyPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphKeyPoint::Vertex { x, y } => {
                write!(f, "vertex ({}, {})", fmt_num(*x), fmt_num(*y))
            }
            GraphKeyPoint::Asymptotes {
                vertical,
                horizontal,
            } => write!(
                f,
                "asymptotes x={}, y={}",
                fmt_num(*vertical),
                fmt_num(*horizontal)
            ),
        }
    }
}

/// Graph attached to a slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDescriptor {
    /// Literal function expression used to render the graph.
    pub expression: String,
    /// Vertex or asymptotes lifted from the slot's inputs, if recognizable.
    #[serde(default)]
    pub key_point: Option<GraphKeyPoint>,
}

/// One question position of an exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSlot {
    /// 1-based position.
    pub position: u8,
    pub section: Section,
    /// Type tag (`exponential`, `rational`, `graph-quadratic`, ...).
    pub kind: String,
    /// Raw HTML/LaTeX prompt.
    pub prompt: String,
    pub answers: AnswerShape,
    /// Dropdown/radio answer.
    #[serde(default)]
    pub choice: Option<String>,
    #[serde(default)]
    pub graph: Option<GraphDescriptor>,
    /// Thematic label, e.g. `bacteria-growth`.
    #[serde(default)]
    pub context: Option<String>,
}

/// A loaded exam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exam {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// File the exam was loaded from.
    #[serde(default)]
    pub source: PathBuf,
    /// True for the immutable baseline exam.
    #[serde(default)]
    pub is_reference: bool,
    /// Slots ordered by position; missing positions are absent.
    pub slots: Vec<QuestionSlot>,
}

impl Exam {
    /// Look up the slot at a 1-based position.
    pub fn slot(&self, position: u8) -> Option<&QuestionSlot> {
        self.slots.iter().find(|s| s.position == position)
    }

    /// Numeric answers at a position, or `None` when the slot is missing or empty.
    pub fn answers(&self, position: u8) -> Option<&AnswerShape> {
        self.slot(position)
            .map(|s| &s.answers)
            .filter(|a| !a.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_display_and_parse() {
        assert_eq!(Section::B.to_string(), "B");
        assert_eq!("c".parse::<Section>().unwrap(), Section::C);
        assert_eq!(" D ".parse::<Section>().unwrap(), Section::D);
        assert!("E".parse::<Section>().is_err());
    }

    #[test]
    fn classify_shapes() {
        assert_eq!(AnswerShape::classify(&[], 0.01), AnswerShape::None);
        assert_eq!(AnswerShape::classify(&[2.0], 0.01), AnswerShape::Single(2.0));
        assert_eq!(
            AnswerShape::classify(&[3.0, -3.0], 0.01),
            AnswerShape::PlusMinus(3.0, -3.0)
        );
        assert_eq!(
            AnswerShape::classify(&[1.0, 5.0], 0.01),
            AnswerShape::Unordered(1.0, 5.0)
        );
        assert!(matches!(
            AnswerShape::classify(&[1.0, 2.0, 3.0], 0.01),
            AnswerShape::Multi(_)
        ));
    }

    #[test]
    fn plus_minus_uses_tolerance() {
        assert!(matches!(
            AnswerShape::classify(&[2.0, -1.995], 0.01),
            AnswerShape::PlusMinus(..)
        ));
        assert!(matches!(
            AnswerShape::classify(&[2.0, -1.98], 0.01),
            AnswerShape::Unordered(..)
        ));
    }

    #[test]
    fn number_formatting() {
        assert_eq!(fmt_num(2.0), "2");
        assert_eq!(fmt_num(-3.0), "-3");
        assert_eq!(fmt_num(0.5), "0.5");
        assert_eq!(fmt_num(4.005), "4.005");
        assert_eq!(fmt_num(-0.00001), "0");
        assert_eq!(fmt_num(-0.0), "0");
        assert_eq!(fmt_num(-0.25), "-0.25");
        assert_eq!(AnswerShape::PlusMinus(3.0, -3.0).to_string(), "[3, -3]");
    }

    #[test]
    fn exam_skips_empty_answers() {
        let exam = Exam {
            id: "e".into(),
            title: String::new(),
            source: PathBuf::from("e.json"),
            is_reference: false,
            slots: vec![QuestionSlot {
                position: 1,
                section: Section::A,
                kind: "identify".into(),
                prompt: String::new(),
                answers: AnswerShape::None,
                choice: Some("exponential".into()),
                graph: None,
                context: None,
            }],
        };
        assert!(exam.slot(1).is_some());
        assert!(exam.answers(1).is_none());
        assert!(exam.slot(2).is_none());
    }
}
