//! Template fragments.
//!
//! A fragment is literal text with `{{ data["path"] }}` placeholders. Each
//! placeholder is replaced by the value of the option at `path` in the value
//! snapshot. There are no expressions, filters or control blocks.

use std::fmt::Write as _;

use crate::{data::ValueTree, error::FragmentError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    Lookup(&'a str),
}

/// A parsed fragment borrowing its source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment<'a> {
    segments: Vec<Segment<'a>>,
}

impl<'a> Fragment<'a> {
    /// Split `source` into literal text and placeholders.
    pub fn parse(source: &'a str) -> Result<Self, FragmentError> {
        let mut segments = Vec::new();
        let mut offset = 0;

        while offset < source.len() {
            let rest = &source[offset..];
            let Some(open) = rest.find('{') else {
                segments.push(Segment::Text(rest));
                break;
            };

            match rest[open + 1..].chars().next() {
                Some('{') => {
                    if open > 0 {
                        segments.push(Segment::Text(&rest[..open]));
                    }
                    let body_start = open + 2;
                    let close = rest[body_start..]
                        .find("}}")
                        .ok_or(FragmentError::Unclosed(offset + open))?;
                    let key = parse_lookup(&rest[body_start..body_start + close])?;
                    segments.push(Segment::Lookup(key));
                    offset += body_start + close + 2;
                }
                Some('%') => return Err(FragmentError::UnsupportedBlock),
                _ => {
                    // A lone brace is literal text.
                    segments.push(Segment::Text(&rest[..open + 1]));
                    offset += open + 1;
                }
            }
        }

        Ok(Self { segments })
    }

    /// Paths referenced by the placeholders, in order of appearance.
    pub fn keys(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Lookup(key) => Some(*key),
            Segment::Text(_) => None,
        })
    }

    /// Substitute every placeholder from `data`.
    pub fn render(&self, data: &ValueTree) -> Result<String, FragmentError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Lookup(key) => {
                    let value = data
                        .get(*key)
                        .ok_or_else(|| FragmentError::UnknownKey(key.to_string()))?;
                    let _ = write!(out, "{value}");
                }
            }
        }
        Ok(out)
    }
}

/// Accept `data["key"]` or `data['key']`, whitespace allowed around tokens.
fn parse_lookup(expr: &str) -> Result<&str, FragmentError> {
    let invalid = || FragmentError::InvalidExpression(expr.trim().to_string());

    let inner = expr
        .trim()
        .strip_prefix("data")
        .map(str::trim_start)
        .and_then(|s| s.strip_prefix('['))
        .and_then(|s| s.strip_suffix(']'))
        .map(str::trim)
        .ok_or_else(invalid)?;

    let key = inner
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| inner.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .ok_or_else(invalid)?;

    if key.is_empty() || key.contains(['"', '\'']) {
        return Err(invalid());
    }
    Ok(key)
}

/// Parse and render in one step.
pub fn render_str(source: &str, data: &ValueTree) -> Result<String, FragmentError> {
    Fragment::parse(source)?.render(data)
}
