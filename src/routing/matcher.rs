//! Path pattern compilation and matching.
//!
//! # Responsibilities
//! - Compile pattern strings into segment lists
//! - Match request paths segment by segment
//! - Extract named and positional captures
//! - Render the matched endpoint back from the captures
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - A single trailing slash is ignored (`/a/` matches `/a`)
//! - Wildcards capture at least one segment and must come last
//! - No regex to guarantee O(n) matching

use std::collections::BTreeMap;

use thiserror::Error;

/// Captures extracted from a matched path, keyed by parameter name.
/// Unnamed wildcards are positional and use the key `"0"`.
pub type RouteParams = BTreeMap<String, String>;

/// Key used for an unnamed `*` wildcard.
pub const POSITIONAL_WILDCARD: &str = "0";

/// Errors raised while compiling a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern must start with '/': {0:?}")]
    MissingLeadingSlash(String),

    #[error("empty parameter name in segment {0:?}")]
    EmptyParamName(String),

    #[error("wildcard must be the last segment")]
    WildcardNotLast,

    #[error("parameter {0:?} appears more than once")]
    DuplicateParam(String),
}

/// One compiled path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
    Wildcard(String),
}

/// Shape of a route, used to order routes by specificity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RouteKind {
    Wildcard,
    Param,
    Exact,
}

/// A compiled path pattern.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Compile a pattern such as `/hooks/{provider}` or `/hooks/*`.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let Some(rest) = pattern.strip_prefix('/') else {
            return Err(PatternError::MissingLeadingSlash(pattern.to_string()));
        };

        let mut segments = Vec::new();
        let mut names: Vec<String> = Vec::new();
        let parts = split_path(rest);
        let last = parts.len().saturating_sub(1);

        for (index, part) in parts.iter().enumerate() {
            let segment = if *part == "*" {
                Segment::Wildcard(POSITIONAL_WILDCARD.to_string())
            } else if let Some(name) = part.strip_prefix("{*").and_then(|p| p.strip_suffix('}')) {
                Segment::Wildcard(non_empty(name, part)?.to_string())
            } else if let Some(name) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                Segment::Param(non_empty(name, part)?.to_string())
            } else if let Some(name) = part.strip_prefix(':') {
                Segment::Param(non_empty(name, part)?.to_string())
            } else {
                Segment::Literal(part.to_string())
            };

            match &segment {
                Segment::Wildcard(name) | Segment::Param(name) => {
                    if matches!(segment, Segment::Wildcard(_)) && index != last {
                        return Err(PatternError::WildcardNotLast);
                    }
                    if names.contains(name) {
                        return Err(PatternError::DuplicateParam(name.clone()));
                    }
                    names.push(name.clone());
                }
                Segment::Literal(_) => {}
            }
            segments.push(segment);
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    /// The pattern as written in the configuration.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn kind(&self) -> RouteKind {
        match self.segments.last() {
            Some(Segment::Wildcard(_)) => RouteKind::Wildcard,
            _ if self.segments.iter().any(|s| matches!(s, Segment::Param(_))) => RouteKind::Param,
            _ => RouteKind::Exact,
        }
    }

    /// Match a request path, returning the decoded captures on success.
    pub fn match_path(&self, path: &str) -> Option<RouteParams> {
        let path = path.strip_prefix('/')?;
        let path = path.strip_suffix('/').unwrap_or(path);
        let parts = split_path(path);
        let mut params = RouteParams::new();

        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(literal) => {
                    if parts.get(index) != Some(&literal.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = parts.get(index).filter(|v| !v.is_empty())?;
                    params.insert(name.clone(), decode(value));
                }
                Segment::Wildcard(name) => {
                    let rest = parts.get(index..).map(|r| r.join("/")).unwrap_or_default();
                    if rest.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), decode(&rest));
                    return Some(params);
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }

    /// Rebuild the concrete path from the captures of a match.
    pub fn render(&self, params: &RouteParams) -> String {
        let mut endpoint = String::new();
        for segment in &self.segments {
            endpoint.push('/');
            match segment {
                Segment::Literal(literal) => endpoint.push_str(literal),
                Segment::Param(name) | Segment::Wildcard(name) => {
                    endpoint.push_str(params.get(name).map(String::as_str).unwrap_or_default())
                }
            }
        }
        if endpoint.is_empty() {
            endpoint.push('/');
        }
        endpoint
    }
}

fn split_path(path: &str) -> Vec<&str> {
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('/').collect()
    }
}

fn non_empty<'a>(name: &'a str, segment: &str) -> Result<&'a str, PatternError> {
    if name.is_empty() {
        Err(PatternError::EmptyParamName(segment.to_string()))
    } else {
        Ok(name)
    }
}

fn decode(value: &str) -> String {
    urlencoding::decode(value)
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| value.to_string())
}
