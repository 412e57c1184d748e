//! Exam loader.
//!
//! Reads the reference answer key (TOML, or JSON in the candidate format)
//! and the candidate exam directory, and normalizes both into [`Exam`]s.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;
use serde_json::Value;

use crate::config::VerifierConfig;
use crate::error::LoadError;
use crate::model::{AnswerShape, Exam, GraphDescriptor, GraphKeyPoint, QuestionSlot, Section};

/// Intermediate JSON structure of a candidate exam file.
#[derive(Debug, Deserialize)]
struct JsonExam {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    questions: Vec<JsonQuestion>,
}

#[derive(Debug, Deserialize)]
struct JsonQuestion {
    #[serde(alias = "position")]
    number: i64,
    section: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    prompt: String,
    #[serde(default)]
    inputs: Vec<JsonInput>,
    #[serde(default)]
    graph: Option<JsonGraph>,
    #[serde(default)]
    context: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JsonInput {
    id: String,
    #[serde(rename = "type")]
    kind: InputKind,
    #[serde(default)]
    answer: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum InputKind {
    Numeric,
    Dropdown,
    Radio,
    Text,
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct JsonGraph {
    #[serde(alias = "fn", alias = "function")]
    expression: String,
}

/// Intermediate TOML structure of a reference answer key.
#[derive(Debug, Deserialize)]
struct TomlAnswerKey {
    exam: TomlExamHeader,
    #[serde(default)]
    slots: Vec<TomlSlot>,
}

#[derive(Debug, Deserialize)]
struct TomlExamHeader {
    id: String,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct TomlSlot {
    position: i64,
    section: String,
    #[serde(default)]
    kind: String,
    #[serde(default)]
    prompt: String,
    #[serde(default)]
    answers: Vec<f64>,
    #[serde(default)]
    choice: Option<String>,
    #[serde(default)]
    expression: Option<String>,
    #[serde(default)]
    vertex: Option<[f64; 2]>,
    #[serde(default)]
    asymptotes: Option<[f64; 2]>,
    #[serde(default)]
    context: Option<String>,
}

/// A slot before position validation.
struct RawSlot {
    position: i64,
    section: String,
    slot: QuestionSlot,
}

/// Load the reference exam. `.toml` is an answer key; anything else is exam JSON.
pub fn load_reference(path: &Path, config: &VerifierConfig) -> Result<Exam> {
    let content = read_file(path)?;
    let mut exam = if path.extension().is_some_and(|ext| ext == "toml") {
        parse_answer_key_str(&content, path, config)?
    } else {
        parse_exam_str(&content, path, config)?
    };
    exam.is_reference = true;
    tracing::debug!("loaded reference {} from {}", exam.id, path.display());
    Ok(exam)
}

/// Parse a single candidate exam file.
pub fn parse_exam(path: &Path, config: &VerifierConfig) -> Result<Exam> {
    let content = read_file(path)?;
    parse_exam_str(&content, path, config)
}

/// Parse a candidate exam JSON string (useful for testing).
pub fn parse_exam_str(content: &str, source_path: &Path, config: &VerifierConfig) -> Result<Exam> {
    let parsed: JsonExam = serde_json::from_str(content).map_err(|source| LoadError::Json {
        path: source_path.to_path_buf(),
        source,
    })?;

    let plus_minus = config.thresholds.plus_minus;
    let raw: Vec<RawSlot> = parsed
        .questions
        .into_iter()
        .map(|q| {
            let mut numbers = Vec::new();
            let mut numeric_ids = Vec::new();
            let mut choice = None;
            for input in &q.inputs {
                match input.kind {
                    InputKind::Numeric => match input.answer.as_ref().and_then(numeric_value) {
                        Some(value) => {
                            numbers.push(value);
                            numeric_ids.push((input.id.as_str(), value));
                        }
                        None => tracing::warn!(
                            "{}: numeric input '{}' has no numeric answer, ignoring",
                            parsed.id,
                            input.id
                        ),
                    },
                    InputKind::Dropdown | InputKind::Radio => {
                        if choice.is_none() {
                            choice = input.answer.as_ref().and_then(choice_value);
                        }
                    }
                    InputKind::Text | InputKind::Other => {}
                }
            }

            let graph = q.graph.map(|g| GraphDescriptor {
                expression: g.expression,
                key_point: lift_key_point(&numeric_ids),
            });

            RawSlot {
                position: q.number,
                section: q.section,
                slot: QuestionSlot {
                    position: 0,
                    section: Section::A,
                    kind: q.kind,
                    prompt: q.prompt,
                    answers: AnswerShape::classify(&numbers, plus_minus),
                    choice,
                    graph,
                    context: q.context,
                },
            }
        })
        .collect();

    build_exam(parsed.id, parsed.title, source_path, raw, config)
}

/// Parse a TOML answer key string (useful for testing).
pub fn parse_answer_key_str(
    content: &str,
    source_path: &Path,
    config: &VerifierConfig,
) -> Result<Exam> {
    let parsed: TomlAnswerKey = toml::from_str(content).map_err(|source| LoadError::Toml {
        path: source_path.to_path_buf(),
        source,
    })?;

    let plus_minus = config.thresholds.plus_minus;
    let raw: Vec<RawSlot> = parsed
        .slots
        .into_iter()
        .map(|s| {
            let key_point = match (s.vertex, s.asymptotes) {
                (Some([x, y]), _) => Some(GraphKeyPoint::Vertex { x, y }),
                (None, Some([vertical, horizontal])) => Some(GraphKeyPoint::Asymptotes {
                    vertical,
                    horizontal,
                }),
                (None, None) => None,
            };
            let graph = if s.expression.is_some() || key_point.is_some() {
                Some(GraphDescriptor {
                    expression: s.expression.unwrap_or_default(),
                    key_point,
                })
            } else {
                None
            };

            RawSlot {
                position: s.position,
                section: s.section,
                slot: QuestionSlot {
                    position: 0,
                    section: Section::A,
                    kind: s.kind,
                    prompt: s.prompt,
                    answers: AnswerShape::classify(&s.answers, plus_minus),
                    choice: s.choice,
                    graph,
                    context: s.context,
                },
            }
        })
        .collect();

    build_exam(parsed.exam.id, parsed.exam.title, source_path, raw, config)
}

/// Validate positions and sections, and order slots by position.
fn build_exam(
    id: String,
    title: String,
    source: &Path,
    raw: Vec<RawSlot>,
    config: &VerifierConfig,
) -> Result<Exam> {
    let slot_count = config.layout.slot_count;
    let mut slots: BTreeMap<u8, QuestionSlot> = BTreeMap::new();

    for RawSlot {
        position,
        section,
        mut slot,
    } in raw
    {
        let position = u8::try_from(position)
            .ok()
            .filter(|p| (1..=slot_count).contains(p))
            .ok_or_else(|| LoadError::SlotOutOfRange {
                exam: id.clone(),
                position,
                slot_count,
            })?;
        slot.position = position;
        slot.section = section
            .parse()
            .map_err(|_| LoadError::UnknownSection {
                exam: id.clone(),
                position,
                section: section.clone(),
            })?;
        if slots.insert(position, slot).is_some() {
            return Err(LoadError::DuplicateSlot {
                exam: id.clone(),
                position,
            }
            .into());
        }
    }

    if slots.len() < usize::from(slot_count) {
        tracing::warn!(
            "{id}: only {} of {slot_count} slots present, missing slots will be skipped",
            slots.len()
        );
    }

    Ok(Exam {
        id,
        title,
        source: source.to_path_buf(),
        is_reference: false,
        slots: slots.into_values().collect(),
    })
}

/// Load all candidate files from a directory, sorted by file name.
///
/// Only files named `<prefix><digits><suffix>` are considered. Any file that
/// fails to parse aborts the load.
pub fn load_candidate_directory(dir: &Path, config: &VerifierConfig) -> Result<Vec<Exam>> {
    if !dir.is_dir() {
        return Err(LoadError::NotADirectory(dir.to_path_buf()).into());
    }

    let entries = std::fs::read_dir(dir).map_err(|source| LoadError::Read {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<(String, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::Read {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            continue;
        };
        if path.is_file() && config.layout.matches_candidate(&name) {
            paths.push((name, path));
        } else {
            tracing::debug!("ignoring {}", path.display());
        }
    }
    paths.sort();

    if paths.is_empty() {
        tracing::warn!("no candidate exams found in {}", dir.display());
    }

    paths
        .iter()
        .map(|(_, path)| {
            let exam = parse_exam(path, config)?;
            tracing::debug!("loaded candidate {} from {}", exam.id, path.display());
            Ok(exam)
        })
        .collect::<Result<Vec<_>>>()
}

/// Load the reference followed by every candidate, in verification order.
pub fn load_exam_set(reference: &Path, dir: &Path, config: &VerifierConfig) -> Result<Vec<Exam>> {
    let mut exams = vec![load_reference(reference, config)?];
    exams.extend(load_candidate_directory(dir, config)?);
    tracing::info!("loaded {} exams ({} candidates)", exams.len(), exams.len() - 1);
    Ok(exams)
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| {
        LoadError::Read {
            path: path.to_path_buf(),
            source,
        }
        .into()
    })
}

fn numeric_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

fn choice_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Which coordinate an input id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Coordinate {
    VertexX,
    VertexY,
    Vertical,
    Horizontal,
}

fn coordinate_hint(id: &str) -> Option<Coordinate> {
    let id = id.to_ascii_lowercase();
    let tokens: Vec<&str> = id
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    let has = |options: &[&str]| tokens.iter().any(|t| options.contains(t));

    if id.contains("vertex") || has(&["vx", "vy"]) {
        if has(&["x", "h", "vx", "xcoord"]) || id.contains("x-coord") || id.contains("x_coord") {
            return Some(Coordinate::VertexX);
        }
        if has(&["y", "k", "vy", "ycoord"]) || id.contains("y-coord") || id.contains("y_coord") {
            return Some(Coordinate::VertexY);
        }
        return None;
    }
    if id.contains("vertical") || has(&["va", "vert"]) {
        return Some(Coordinate::Vertical);
    }
    if id.contains("horizontal") || has(&["ha", "horiz"]) {
        return Some(Coordinate::Horizontal);
    }
    None
}

/// Lift a vertex or asymptote pair from recognizable numeric input ids.
fn lift_key_point(numeric: &[(&str, f64)]) -> Option<GraphKeyPoint> {
    let find = |wanted: Coordinate| {
        numeric
            .iter()
            .find(|(id, _)| coordinate_hint(id) == Some(wanted))
            .map(|(_, v)| *v)
    };

    if let (Some(x), Some(y)) = (find(Coordinate::VertexX), find(Coordinate::VertexY)) {
        return Some(GraphKeyPoint::Vertex { x, y });
    }
    if let (Some(vertical), Some(horizontal)) =
        (find(Coordinate::Vertical), find(Coordinate::Horizontal))
    {
        return Some(GraphKeyPoint::Asymptotes {
            vertical,
            horizontal,
        });
    }
    None
}
