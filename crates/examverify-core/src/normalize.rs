//! Prompt and expression normalization.
//!
//! `normalize_prompt` removes layout-only markup so cosmetically different
//! prompts compare equal. It only ever drops markup that cannot change the
//! math: two strings that normalize equal must read the same.

use serde::{Deserialize, Serialize};

/// LaTeX commands that only affect spacing or delimiter sizing.
const LAYOUT_COMMANDS: &[&str] = &[
    "left",
    "right",
    "quad",
    "qquad",
    "displaystyle",
    "textstyle",
    "big",
    "Big",
    "bigl",
    "bigr",
];

/// Strip HTML tags, math delimiters, spacing escapes and whitespace.
pub fn normalize_prompt(raw: &str) -> String {
    let text = replace_entities(&strip_tags(raw));
    let text = strip_latex_layout(&text);
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    unwrap_single_char_groups(&compact)
}

/// Normalized prompt with every numeric literal replaced by `#`.
pub fn equation_template(raw: &str) -> String {
    let normalized = normalize_prompt(raw);
    let mut out = String::with_capacity(normalized.len());
    let mut chars = normalized.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_ascii_digit() {
            while chars
                .peek()
                .is_some_and(|n| n.is_ascii_digit() || *n == '.')
            {
                chars.next();
            }
            out.push('#');
        } else {
            out.push(c);
        }
    }
    out
}

fn strip_tags(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        // `x < 3` is an inequality, not markup
        if !rest[start + 1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!')
        {
            out.push('<');
            rest = &rest[start + 1..];
            continue;
        }
        let Some(len) = rest[start..].find('>') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let tag = rest[start + 1..start + len]
            .trim()
            .trim_end_matches('/')
            .to_ascii_lowercase();
        let name = tag.split_whitespace().next().unwrap_or("");
        // Superscripts and subscripts carry meaning; keep their extent braced.
        match name {
            "sup" => out.push_str("^{"),
            "sub" => out.push_str("_{"),
            "/sup" | "/sub" => out.push('}'),
            _ => {}
        }
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    out
}

fn replace_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&thinsp;", " ")
        .replace("&minus;", "-")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

fn strip_latex_layout(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '$' => {}
            '\\' => match chars.peek().copied() {
                // math delimiters and spacing escapes
                Some('(' | ')' | '[' | ']' | ',' | ';' | ':' | '!' | ' ') => {
                    chars.next();
                }
                Some(n) if n.is_ascii_alphabetic() => {
                    let mut name = String::new();
                    while let Some(&l) = chars.peek() {
                        if !l.is_ascii_alphabetic() {
                            break;
                        }
                        name.push(l);
                        chars.next();
                    }
                    if !LAYOUT_COMMANDS.contains(&name.as_str()) {
                        out.push('\\');
                        out.push_str(&name);
                    }
                }
                _ => out.push('\\'),
            },
            _ => out.push(c),
        }
    }
    out
}

/// `2^{x}` and `2^x` are the same; `2^{x+1}` stays braced.
fn unwrap_single_char_groups(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '{'
            && i + 2 < chars.len()
            && chars[i + 2] == '}'
            && !matches!(chars[i + 1], '{' | '}' | '\\')
            && i > 0
            && matches!(chars[i - 1], '^' | '_')
        {
            out.push(chars[i + 1]);
            i += 3;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

/// Direction a parabola opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Opening {
    Up,
    Down,
}

impl std::fmt::Display for Opening {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Opening::Up => write!(f, "up"),
            Opening::Down => write!(f, "down"),
        }
    }
}

/// Opening direction from the sign of the leading coefficient of a quadratic.
///
/// The quadratic term is either a top-level square outside any denominator
/// (`-(x+2)^2`, `3 - x^2`) or a product of two linear factors in `x`
/// (`-x(x-4)`). Returns `None` when neither is present.
pub fn opening_direction(expression: &str) -> Option<Opening> {
    let mut expr: String = expression
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if let Some(eq) = expr.rfind('=') {
        expr = expr[eq + 1..].to_string();
    }
    let expr = expr
        .replace("**", "^")
        .replace('²', "^2")
        .replace("^{2}", "^2")
        .replace('−', "-");

    let terms = split_terms(&expr);
    terms
        .iter()
        .find(|term| has_square(numerator(term)))
        .map(|term| {
            if term.starts_with('-') {
                Opening::Down
            } else {
                Opening::Up
            }
        })
        .or_else(|| terms.iter().find_map(|term| factored_direction(term)))
}

/// Split into signed top-level terms; a sign after `^ * / (` or `e` is part of a factor.
fn split_terms(expr: &str) -> Vec<String> {
    let mut terms = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut prev: Option<char> = None;
    for c in expr.chars() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            '+' | '-'
                if depth == 0
                    && !current.is_empty()
                    && !matches!(prev, Some('^' | '*' | '/' | '(' | 'e' | 'E')) =>
            {
                terms.push(std::mem::take(&mut current));
            }
            _ => {}
        }
        current.push(c);
        prev = Some(c);
    }
    if !current.is_empty() {
        terms.push(current);
    }
    terms
}

/// The part of a term before its first top-level `/`.
fn numerator(term: &str) -> &str {
    let mut depth = 0i32;
    for (idx, c) in term.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            '/' if depth == 0 => return &term[..idx],
            _ => {}
        }
    }
    term
}

/// Direction of a term that multiplies exactly two linear factors in `x`.
fn factored_direction(term: &str) -> Option<Opening> {
    let term = numerator(term);
    let (mut negative, body) = match term.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, term.strip_prefix('+').unwrap_or(term)),
    };

    let mut degree = 0;
    let mut depth = 0i32;
    let mut group_start = 0;
    for (idx, c) in body.char_indices() {
        match c {
            '(' => {
                if depth == 0 {
                    group_start = idx + 1;
                }
                depth += 1;
            }
            ')' => {
                depth -= 1;
                if depth == 0 {
                    let inner = &body[group_start..idx];
                    if inner.contains('x') {
                        degree += 1;
                        negative ^= linear_coefficient_is_negative(inner)?;
                    }
                }
            }
            'x' if depth == 0 => degree += 1,
            '^' if depth == 0 => return None,
            _ => {}
        }
    }

    (degree == 2).then_some(if negative {
        Opening::Down
    } else {
        Opening::Up
    })
}

/// Sign of the `x` coefficient in a linear factor such as `x-4` or `3-2x`.
fn linear_coefficient_is_negative(factor: &str) -> Option<bool> {
    let terms = split_terms(factor);
    let mut with_x = terms.iter().filter(|t| t.contains('x'));
    let term = with_x.next()?;
    if with_x.next().is_some() || term.contains(['^', '(']) {
        return None;
    }
    Some(term.starts_with('-'))
}

fn has_square(term: &str) -> bool {
    term.match_indices("^2").any(|(idx, _)| {
        !term[idx + 2..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
    })
}
