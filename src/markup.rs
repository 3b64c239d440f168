//! Light markup rendering for assistant messages
//!
//! The model marks emphasis with `**bold**` and sometimes `*bold*`. Both are
//! rendered as bold; everything else, including stray stars, is shown as is.

use colored::Colorize;
use regex::Regex;
use std::sync::OnceLock;

/// A run of text with uniform style
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub bold: bool,
}

impl Span {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }

    fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
        }
    }
}

/// One rendered line
pub type Line = Vec<Span>;

fn double_star() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").ok())
        .as_ref()
}

/// Splits `text` into styled lines
///
/// # Examples
///
/// ```
/// use miguelbot::markup::{render, Span};
///
/// let lines = render("**Pregunta 1:** elige *una* opción");
/// assert_eq!(lines.len(), 1);
/// assert!(lines[0][0].bold);
/// assert_eq!(lines[0][0].text, "Pregunta 1:");
/// ```
pub fn render(text: &str) -> Vec<Line> {
    text.split('\n').map(render_line).collect()
}

/// Renders `text` for a terminal, bolding emphasized spans
pub fn to_ansi(text: &str) -> String {
    render(text)
        .iter()
        .map(|line| {
            line.iter()
                .map(|span| {
                    if span.bold {
                        span.text.bold().to_string()
                    } else {
                        span.text.clone()
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A character of the line, or a bold boundary left by an emphasis pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Char(char),
    Open,
    Close,
}

fn render_line(line: &str) -> Line {
    let mut units = resolve_double_stars(line);
    resolve_single_stars(&mut units);
    to_spans(&units)
}

fn resolve_double_stars(line: &str) -> Vec<Unit> {
    let mut units = Vec::with_capacity(line.len());
    let mut cursor = 0;

    if let Some(re) = double_star() {
        for caps in re.captures_iter(line) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            units.extend(line[cursor..whole.start()].chars().map(Unit::Char));
            units.push(Unit::Open);
            units.extend(inner.as_str().chars().map(Unit::Char));
            units.push(Unit::Close);
            cursor = whole.end();
        }
    }

    units.extend(line[cursor..].chars().map(Unit::Char));
    units
}

/// Turns `*x*` pairs into bold boundaries
///
/// Runs over the whole line after `**` spans are resolved, so a pair may
/// wrap a bold span or sit inside one. Boundaries count as non-whitespace.
fn resolve_single_stars(units: &mut [Unit]) {
    let mut p = 0;
    while p < units.len() {
        if !opens_at(units, p) {
            p += 1;
            continue;
        }
        match (p + 1..units.len()).find(|&q| closes_at(units, q)) {
            Some(q) => {
                units[p] = Unit::Open;
                units[q] = Unit::Close;
                p = q + 1;
            }
            None => p += 1,
        }
    }
}

fn is_star(unit: Option<&Unit>) -> bool {
    matches!(unit, Some(Unit::Char('*')))
}

fn is_space(unit: Option<&Unit>) -> bool {
    matches!(unit, Some(Unit::Char(c)) if c.is_whitespace())
}

fn opens_at(units: &[Unit], p: usize) -> bool {
    is_star(units.get(p))
        && (p == 0 || is_space(units.get(p - 1)))
        && !is_space(units.get(p + 1))
}

fn closes_at(units: &[Unit], q: usize) -> bool {
    is_star(units.get(q)) && (q + 1 == units.len() || is_space(units.get(q + 1)))
}

/// Text inside any open boundary is bold
fn to_spans(units: &[Unit]) -> Line {
    let mut spans: Line = Vec::new();
    let mut depth = 0usize;

    for unit in units {
        match *unit {
            Unit::Open => depth += 1,
            Unit::Close => depth = depth.saturating_sub(1),
            Unit::Char(c) => {
                let bold = depth > 0;
                match spans.last_mut() {
                    Some(last) if last.bold == bold => last.text.push(c),
                    _ if bold => spans.push(Span::bold(c)),
                    _ => spans.push(Span::plain(c)),
                }
            }
        }
    }
    spans
}
