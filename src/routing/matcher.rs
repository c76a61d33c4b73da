//! Path pattern matching.
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - A `:name` segment matches exactly one non-empty segment
//! - Trailing slashes are insignificant (`/api/trains/` == `/api/trains`)
//! - No regex to guarantee O(segments) matching

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A compiled path pattern like `/api/trains/:id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(s.to_string()),
            })
            .collect();
        Self {
            raw: pattern.to_string(),
            segments,
        }
    }

    /// The pattern as written, for logging and error reporting.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, path: &str) -> bool {
        let mut parts = path.split('/').filter(|s| !s.is_empty());
        for segment in &self.segments {
            match (segment, parts.next()) {
                (Segment::Literal(literal), Some(part)) if literal == part => {}
                (Segment::Param(_), Some(_)) => {}
                _ => return false,
            }
        }
        parts.next().is_none()
    }
}
