//! Route pattern DSL.
//!
//! ```text
//! /name/:required1/:required2?optional1=&optional2=
//! ```
//!
//! - Path segments after the leading slash are literals or `:name`
//!   placeholders. The first literal segment is the command name.
//! - A placeholder may carry an inline regex constraint: `:n(\d+)`.
//! - Keys of the query part are optional parameters; their values in the
//!   pattern are ignored.
//!
//! A [`Route`] pairs a parsed pattern with its handler. Routes are built once
//! at startup and never mutated afterwards.

use std::sync::Arc;

use percent_encoding::percent_decode_str;
use regex::Regex;

use crate::error::{RouteError, RouteResult};
use crate::handler::{BoxedHandler, Handler};
use crate::params::Params;

// =============================================================================
// Segments
// =============================================================================

/// One path segment of a route pattern.
#[derive(Debug, Clone)]
pub enum Segment {
    /// Must equal the request segment exactly.
    Literal(String),
    /// Binds the request segment to `name`.
    Param {
        /// Parameter name.
        name: String,
        /// Inline constraint, anchored to the whole segment.
        constraint: Option<Regex>,
    },
}

impl Segment {
    /// Returns whether `value` satisfies this segment's constraint.
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Segment::Literal(lit) => lit == value,
            Segment::Param { constraint, .. } => {
                !value.is_empty() && constraint.as_ref().is_none_or(|re| re.is_match(value))
            }
        }
    }
}

// =============================================================================
// RoutePattern
// =============================================================================

/// A parsed route pattern.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
    query: Vec<String>,
}

impl RoutePattern {
    /// Parses a pattern string.
    pub fn parse(raw: &str) -> RouteResult<Self> {
        if raw.trim().is_empty() {
            return Err(RouteError::EmptyPattern);
        }
        let Some(rest) = raw.strip_prefix('/') else {
            return Err(RouteError::MissingLeadingSlash(raw.to_string()));
        };

        let (path, query) = match split_top_level(rest, '?', raw)?.as_slice() {
            [path] => (path.to_string(), None),
            [path, query, ..] => (path.to_string(), Some(query.to_string())),
            [] => (String::new(), None),
        };

        let mut segments = Vec::new();
        let parts = split_top_level(path.trim_end_matches('/'), '/', raw)?;
        for part in parts {
            if part.is_empty() {
                // `"/"` alone has no segments at all.
                if path.is_empty() {
                    break;
                }
                return Err(RouteError::EmptySegment(raw.to_string()));
            }
            segments.push(parse_segment(part, raw)?);
        }

        let query = query
            .map(|q| {
                q.split('&')
                    .map(|pair| pair.split_once('=').map_or(pair, |(k, _)| k))
                    .filter(|k| !k.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            raw: raw.to_string(),
            segments,
            query,
        })
    }

    /// Returns the pattern as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the path segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the command name: the first segment, when it is a literal.
    pub fn command_name(&self) -> Option<&str> {
        match self.segments.first() {
            Some(Segment::Literal(name)) => Some(name),
            _ => None,
        }
    }

    /// Names of the required (path) parameters in declaration order.
    pub fn required_params(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Names of the optional (query) parameters in declaration order.
    pub fn optional_params(&self) -> &[String] {
        &self.query
    }

    /// Returns whether `name` is a declared optional parameter.
    pub fn has_optional(&self, name: &str) -> bool {
        self.query.iter().any(|k| k == name)
    }

    /// Matches a plain HTTP request path and query.
    ///
    /// Every path segment must match. Declared query keys are bound when
    /// present and may be absent; undeclared keys are ignored.
    pub fn match_request(&self, path: &str, query: &[(String, String)]) -> Option<Params> {
        let trimmed = path.strip_prefix('/').unwrap_or(path).trim_end_matches('/');
        let parts: Vec<&str> = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('/').collect()
        };

        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = Params::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            let value = percent_decode_str(part).decode_utf8_lossy();
            if !segment.accepts(&value) {
                return None;
            }
            if let Segment::Param { name, .. } = segment {
                params.insert(name.clone(), value.into_owned());
            }
        }

        for key in &self.query {
            if let Some((_, value)) = query.iter().find(|(k, _)| k == key) {
                params.insert(key.clone(), value.clone());
            }
        }

        Some(params)
    }
}

impl std::fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_segment(part: &str, raw: &str) -> RouteResult<Segment> {
    let Some(param) = part.strip_prefix(':') else {
        return Ok(Segment::Literal(
            percent_decode_str(part).decode_utf8_lossy().into_owned(),
        ));
    };

    let (name, constraint) = match param.find('(') {
        Some(open) => {
            let body = param[open..]
                .strip_prefix('(')
                .and_then(|s| s.strip_suffix(')'))
                .ok_or_else(|| RouteError::UnbalancedParenthesis(raw.to_string()))?;
            (&param[..open], Some(body))
        }
        None => (param, None),
    };

    if name.is_empty() {
        return Err(RouteError::EmptyParameterName(raw.to_string()));
    }

    let constraint = constraint
        .map(|body| {
            Regex::new(&format!("^(?:{body})$")).map_err(|e| RouteError::InvalidConstraint {
                name: name.to_string(),
                reason: e.to_string(),
            })
        })
        .transpose()?;

    Ok(Segment::Param {
        name: name.to_string(),
        constraint,
    })
}

/// Splits on `sep` outside parentheses. `?` splits only once.
fn split_top_level<'a>(input: &'a str, sep: char, raw: &str) -> RouteResult<Vec<&'a str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut escaped = false;

    for (idx, ch) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| RouteError::UnbalancedParenthesis(raw.to_string()))?;
            }
            c if c == sep && depth == 0 => {
                parts.push(&input[start..idx]);
                start = idx + c.len_utf8();
                if sep == '?' {
                    break;
                }
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(RouteError::UnbalancedParenthesis(raw.to_string()));
    }
    parts.push(&input[start..]);
    Ok(parts)
}

// =============================================================================
// Route
// =============================================================================

/// A route pattern paired with its handler.
///
/// The handler is never mutated; the pattern and optional description travel
/// alongside it.
#[derive(Clone)]
pub struct Route {
    pattern: RoutePattern,
    handler: BoxedHandler,
    description: Option<String>,
}

impl Route {
    /// Parses `pattern` and pairs it with `handler`.
    pub fn new<H: Handler>(pattern: &str, handler: H) -> RouteResult<Self> {
        Ok(Self {
            pattern: RoutePattern::parse(pattern)?,
            handler: Arc::new(handler),
            description: None,
        })
    }

    /// Sets the description shown to users for the derived command.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the parsed pattern.
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// Returns the handler.
    pub fn handler(&self) -> &BoxedHandler {
        &self.handler
    }

    /// Returns the explicit description, if any.
    pub fn explicit_description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern.as_str())
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_full_pattern() {
        let pattern = RoutePattern::parse("/hello/:name/:title?age=&city=").unwrap();
        assert_eq!(pattern.command_name(), Some("hello"));
        assert_eq!(pattern.required_params().collect::<Vec<_>>(), ["name", "title"]);
        assert_eq!(pattern.optional_params(), ["age", "city"]);
        assert!(pattern.has_optional("age"));
        assert!(!pattern.has_optional("name"));
    }

    #[test]
    fn test_parse_constraint_with_question_mark() {
        let pattern = RoutePattern::parse(r"/roll/:n(\d+)/:unit(d(?:4|6))?mod=").unwrap();
        assert_eq!(pattern.required_params().collect::<Vec<_>>(), ["n", "unit"]);
        assert_eq!(pattern.optional_params(), ["mod"]);
        assert!(pattern.segments()[1].accepts("12"));
        assert!(!pattern.segments()[1].accepts("1a"));
        assert!(pattern.segments()[2].accepts("d6"));
        assert!(!pattern.segments()[2].accepts("d8"));
    }

    #[test]
    fn test_parse_root_and_no_query() {
        let root = RoutePattern::parse("/").unwrap();
        assert!(root.segments().is_empty());
        assert!(root.command_name().is_none());

        let plain = RoutePattern::parse("/ping").unwrap();
        assert_eq!(plain.command_name(), Some("ping"));
        assert!(plain.optional_params().is_empty());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(RoutePattern::parse(" ").unwrap_err(), RouteError::EmptyPattern);
        assert!(matches!(
            RoutePattern::parse("hello"),
            Err(RouteError::MissingLeadingSlash(_))
        ));
        assert!(matches!(
            RoutePattern::parse("/a//b"),
            Err(RouteError::EmptySegment(_))
        ));
        assert!(matches!(
            RoutePattern::parse("/a/:"),
            Err(RouteError::EmptyParameterName(_))
        ));
        assert!(matches!(
            RoutePattern::parse(r"/a/:n(\d+"),
            Err(RouteError::UnbalancedParenthesis(_))
        ));
        assert!(matches!(
            RoutePattern::parse("/a/:n([)"),
            Err(RouteError::InvalidConstraint { .. })
        ));
    }

    #[test]
    fn test_match_request_binds_path_and_query() {
        let pattern = RoutePattern::parse("/hello/:name?age=").unwrap();

        let params = pattern
            .match_request("/hello/Ann%20Lee", &pairs(&[("age", "9"), ("x", "1")]))
            .unwrap();
        assert_eq!(params.get("name"), Some("Ann Lee"));
        assert_eq!(params.get("age"), Some("9"));
        assert!(!params.contains("x"));

        let params = pattern.match_request("/hello/Ann", &[]).unwrap();
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_match_request_rejects() {
        let pattern = RoutePattern::parse(r"/roll/:n(\d+)").unwrap();
        assert!(pattern.match_request("/roll/x", &[]).is_none());
        assert!(pattern.match_request("/roll", &[]).is_none());
        assert!(pattern.match_request("/roll/1/2", &[]).is_none());
        assert!(pattern.match_request("/rolls/1", &[]).is_none());
        assert!(pattern.match_request("/roll/3/", &[]).is_some());
    }
}
