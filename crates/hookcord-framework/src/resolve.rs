//! Parameter resolution for slash-command interactions.
//!
//! ```text
//! pattern  /hello/:name?age=
//! options  [age=9, name=Ann]
//!            │        │
//!            │        └── path slot ──► /hello/Ann
//!            └────────── query slot ──► ?age=9
//! ```
//!
//! Options are scanned from the end. Each one naming a declared query key
//! fills that slot and is removed; every remaining option fills the path
//! placeholder of the same name. Options matching no slot are still handed to
//! the handler but leave the URL untouched.

use hookcord_core::{CommandOptionValue, Url};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::error::{ResolveError, ResolveResult};
use crate::params::Params;
use crate::route::{RoutePattern, Segment};

/// Characters escaped inside a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'%');

/// A resolved interaction: concrete path, query and parameter map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Decoded path segments after substitution.
    pub path_segments: Vec<String>,
    /// Query pairs in declared order.
    pub query: Vec<(String, String)>,
    /// Parameters handed to the handler.
    pub params: Params,
}

impl Resolution {
    /// Returns the resolved path, percent-encoding each segment.
    pub fn path(&self) -> String {
        if self.path_segments.is_empty() {
            return "/".to_string();
        }
        self.path_segments
            .iter()
            .map(|s| format!("/{}", utf8_percent_encode(s, SEGMENT)))
            .collect()
    }

    /// Builds the synthetic request URL on top of `base`.
    pub fn to_url(&self, base: &Url) -> ResolveResult<Url> {
        let mut url = base.clone();
        if url.cannot_be_a_base() {
            return Err(ResolveError::InvalidUrl(base.to_string()));
        }
        url.set_path(&self.path());
        url.set_query(None);
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        url.set_fragment(None);
        Ok(url)
    }
}

/// Resolves interaction `options` against `pattern`.
pub fn resolve_options(
    pattern: &RoutePattern,
    options: &[CommandOptionValue],
) -> ResolveResult<Resolution> {
    let mut remaining: Vec<(String, String)> = options
        .iter()
        .map(|o| (o.name.clone(), o.value_string()))
        .collect();
    let mut params = Params::new();
    let mut filled: Vec<(String, String)> = Vec::new();

    for index in (0..remaining.len()).rev() {
        if pattern.has_optional(&remaining[index].0) {
            let (name, value) = remaining.remove(index);
            params.insert(name.clone(), value.clone());
            filled.push((name, value));
        }
    }

    let query = pattern
        .optional_params()
        .iter()
        .filter_map(|key| filled.iter().find(|(k, _)| k == key).cloned())
        .collect();

    let mut path_segments = Vec::with_capacity(pattern.segments().len());
    for segment in pattern.segments() {
        match segment {
            Segment::Literal(lit) => path_segments.push(lit.clone()),
            Segment::Param { name, .. } => {
                let Some((_, value)) = remaining.iter().find(|(k, _)| k == name) else {
                    return Err(ResolveError::MissingParameter(name.clone()));
                };
                if !segment.accepts(value) {
                    return Err(ResolveError::ConstraintMismatch {
                        name: name.clone(),
                        value: value.clone(),
                    });
                }
                path_segments.push(value.clone());
            }
        }
    }

    for (name, value) in remaining {
        params.insert(name, value);
    }

    Ok(Resolution {
        path_segments,
        query,
        params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(items: &[(&str, &str)]) -> Vec<CommandOptionValue> {
        items
            .iter()
            .map(|(k, v)| CommandOptionValue::new(*k, *v))
            .collect()
    }

    #[test]
    fn test_hello_resolution() {
        let pattern = RoutePattern::parse("/hello/:name?age=").unwrap();
        let res = resolve_options(&pattern, &opts(&[("age", "9"), ("name", "Ann")])).unwrap();

        let expected: Params = [("age", "9"), ("name", "Ann")].into_iter().collect();
        assert_eq!(res.params, expected);
        assert_eq!(res.path(), "/hello/Ann");

        let url = res.to_url(&Url::parse("http://127.0.0.1:8080/").unwrap()).unwrap();
        assert_eq!(url.path(), "/hello/Ann");
        assert_eq!(url.query(), Some("age=9"));
    }

    #[test]
    fn test_required_only_leaves_query_empty() {
        let pattern = RoutePattern::parse("/hello/:name?age=").unwrap();
        let res = resolve_options(&pattern, &opts(&[("name", "Bo")])).unwrap();
        assert!(res.query.is_empty());
        assert_eq!(res.path_segments, ["hello", "Bo"]);

        let url = res.to_url(&Url::parse("http://h/?stale=1").unwrap()).unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_optional_only_leaves_path_untouched() {
        let pattern = RoutePattern::parse("/list?page=&size=").unwrap();
        let res = resolve_options(&pattern, &opts(&[("size", "5"), ("page", "2")])).unwrap();
        assert_eq!(res.path(), "/list");
        assert_eq!(
            res.query,
            [("page".to_string(), "2".to_string()), ("size".to_string(), "5".to_string())]
        );
    }

    #[test]
    fn test_unknown_option_passes_through() {
        let pattern = RoutePattern::parse("/hello/:name").unwrap();
        let res = resolve_options(&pattern, &opts(&[("name", "Ann"), ("extra", "x")])).unwrap();
        assert_eq!(res.params.get("extra"), Some("x"));
        assert_eq!(res.path(), "/hello/Ann");
        assert!(res.query.is_empty());
    }

    #[test]
    fn test_missing_and_mismatched() {
        let pattern = RoutePattern::parse(r"/roll/:n(\d+)").unwrap();
        assert_eq!(
            resolve_options(&pattern, &[]),
            Err(ResolveError::MissingParameter("n".into()))
        );
        assert_eq!(
            resolve_options(&pattern, &opts(&[("n", "x")])),
            Err(ResolveError::ConstraintMismatch {
                name: "n".into(),
                value: "x".into()
            })
        );
    }

    #[test]
    fn test_values_are_percent_encoded() {
        let pattern = RoutePattern::parse("/say/:text").unwrap();
        let res = resolve_options(&pattern, &opts(&[("text", "a b/c")])).unwrap();
        assert_eq!(res.path(), "/say/a%20b%2Fc");
        assert_eq!(res.params.get("text"), Some("a b/c"));
    }
}
