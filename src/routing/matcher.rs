//! Path prefix matching.
//!
//! # Responsibilities
//! - Split paths and patterns into `/`-delimited segments
//! - Count how many leading segments a pattern matches
//! - Recognise `:named` and `*wildcard` parameter segments
//!
//! # Design Decisions
//! - Leading and trailing slashes are ignored, so `"/"` and `""` are one empty segment
//! - A pattern longer than the path never matches (length 0)
//! - No backtracking, no regex: a single left-to-right scan

use std::fmt;

const NAMED_MARKER: char = ':';
const WILDCARD_MARKER: char = '*';

/// Split a path into segments the way routes are compared.
fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.trim_matches('/').split('/')
}

fn is_parameter(segment: &str) -> bool {
    segment.starts_with(NAMED_MARKER) || segment.starts_with(WILDCARD_MARKER)
}

/// Returns the number of leading path segments `pattern` matches as a prefix.
///
/// Parameters written as `:name` or `*name` match any segment at their position.
pub fn matching_prefix_len(path: &str, pattern: &str) -> usize {
    let path_segments: Vec<&str> = segments(path).collect();
    let pattern_segments: Vec<&str> = segments(pattern).collect();

    if pattern_segments.len() > path_segments.len() {
        return 0;
    }

    path_segments
        .iter()
        .zip(pattern_segments.iter())
        .take_while(|(given, expected)| given == expected || is_parameter(expected))
        .count()
}

/// A single segment of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    /// `:name`, matches exactly one segment.
    Param(String),
    /// `*name`, conceptually the rest of the path.
    Wildcard(String),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        if let Some(name) = raw.strip_prefix(NAMED_MARKER) {
            Segment::Param(name.to_string())
        } else if let Some(name) = raw.strip_prefix(WILDCARD_MARKER) {
            Segment::Wildcard(name.to_string())
        } else {
            Segment::Literal(raw.to_string())
        }
    }

    fn matches(&self, given: &str) -> bool {
        match self {
            Segment::Literal(literal) => literal == given,
            Segment::Param(_) | Segment::Wildcard(_) => true,
        }
    }
}

/// A pre-split route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let segments = segments(&raw).map(Segment::parse).collect();
        Self { raw, segments }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Same semantics as [`matching_prefix_len`], without re-splitting the pattern.
    pub fn matching_prefix_len(&self, path: &str) -> usize {
        let path_segments: Vec<&str> = segments(path).collect();
        if self.segments.len() > path_segments.len() {
            return 0;
        }

        self.segments
            .iter()
            .zip(path_segments)
            .take_while(|(expected, given)| expected.matches(given))
            .count()
    }

    /// Render the pattern in axum's path syntax (`{name}`, `{*name}`).
    pub fn to_axum_path(&self) -> String {
        let mut path = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) if literal.is_empty() => {}
                Segment::Literal(literal) => {
                    path.push('/');
                    path.push_str(literal);
                }
                Segment::Param(name) => {
                    path.push_str("/{");
                    path.push_str(name);
                    path.push('}');
                }
                Segment::Wildcard(name) => {
                    path.push_str("/{*");
                    path.push_str(name);
                    path.push('}');
                }
            }
        }
        if path.is_empty() {
            path.push('/');
        }
        path
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
