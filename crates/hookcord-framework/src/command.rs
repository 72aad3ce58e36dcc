//! Command derivation.
//!
//! Every route whose first segment is a literal becomes a slash command:
//!
//! ```text
//! /hello/:name/:title?age=&city=
//!  ───┬─ ──┬── ───┬── ──┬─ ──┬──
//!   name  req    req   opt  opt
//! ```
//!
//! Required options (path placeholders) always precede optional ones (query
//! keys), each group keeping its declared order.

use std::collections::HashSet;
use std::sync::LazyLock;

use hookcord_core::{CommandOptionSchema, CommandSchema};
use regex::Regex;
use tracing::warn;

use crate::route::Route;

/// Longest description the platform accepts.
pub const MAX_DESCRIPTION_LEN: usize = 100;

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-_\p{L}\p{N}\p{Devanagari}\p{Thai}]{1,32}$").expect("name regex is valid")
});

/// Returns whether `name` is an acceptable command or option name.
///
/// Accepts 1 to 32 letters, digits, `-` or `_`, including Devanagari and
/// Thai combining marks.
pub fn is_valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

/// Derives the command schema for `route`.
///
/// Returns `None`, logging a warning, when the route has no literal first
/// segment, any derived name is rejected, or two options share a name.
pub fn derive_command(route: &Route) -> Option<CommandSchema> {
    let pattern = route.pattern();

    let Some(name) = pattern.command_name() else {
        warn!(route = %pattern, "Route has no command name, not registering");
        return None;
    };

    let required = pattern
        .required_params()
        .map(|p| CommandOptionSchema::string(p, true));
    let optional = pattern
        .optional_params()
        .iter()
        .map(|p| CommandOptionSchema::string(p.as_str(), false));
    let options: Vec<_> = required.chain(optional).collect();

    for candidate in std::iter::once(name).chain(options.iter().map(|o| o.name.as_str())) {
        if !is_valid_name(candidate) {
            warn!(route = %pattern, name = candidate, "Invalid command name, not registering");
            return None;
        }
    }

    let mut seen = HashSet::with_capacity(options.len());
    if let Some(dup) = options.iter().find(|o| !seen.insert(o.name.as_str())) {
        warn!(route = %pattern, option = %dup.name, "Duplicate option name, not registering");
        return None;
    }

    let description = route
        .explicit_description()
        .unwrap_or(pattern.as_str())
        .chars()
        .take(MAX_DESCRIPTION_LEN)
        .collect();

    Some(CommandSchema {
        name: name.to_string(),
        description,
        options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookcord_core::{ConnectionInfo, Request};

    use crate::params::Params;

    async fn noop(_: Request, _: ConnectionInfo, _: Params) -> &'static str {
        ""
    }

    #[test]
    fn test_name_charset() {
        for ok in ["hello", "a", "with-dash_and_1", "नमस्ते", "สวัสดี", "日本語", &"x".repeat(32)] {
            assert!(is_valid_name(ok), "{ok}");
        }
        for bad in ["", "has space", "dot.ted", "emoji😀", "slash/", &"x".repeat(33)] {
            assert!(!is_valid_name(bad), "{bad}");
        }
    }

    #[test]
    fn test_required_before_optional() {
        let route = Route::new("/hello/:name/:title?age=&city=", noop).unwrap();
        let cmd = derive_command(&route).unwrap();
        assert_eq!(cmd.name, "hello");
        let names: Vec<_> = cmd.options.iter().map(|o| (o.name.as_str(), o.required)).collect();
        assert_eq!(
            names,
            [("name", true), ("title", true), ("age", false), ("city", false)]
        );
        assert_eq!(cmd.description, "/hello/:name/:title?age=&city=");
    }

    #[test]
    fn test_description_override_and_cap() {
        let route = Route::new("/ping", noop).unwrap().description("Replies with pong");
        assert_eq!(derive_command(&route).unwrap().description, "Replies with pong");

        let long = Route::new("/ping", noop).unwrap().description("y".repeat(150));
        assert_eq!(derive_command(&long).unwrap().description.len(), MAX_DESCRIPTION_LEN);
    }

    #[test]
    fn test_rejected_routes() {
        let bad_name = Route::new("/bad.name", noop).unwrap();
        assert!(derive_command(&bad_name).is_none());

        let param_first = Route::new("/:name", noop).unwrap();
        assert!(derive_command(&param_first).is_none());

        let bad_option = Route::new("/ok?bad key=", noop).unwrap();
        assert!(derive_command(&bad_option).is_none());

        let path_and_query = Route::new("/echo/:x?x=", noop).unwrap();
        assert!(derive_command(&path_and_query).is_none());

        let repeated_path = Route::new("/a/:x/:x", noop).unwrap();
        assert!(derive_command(&repeated_path).is_none());
    }

    #[test]
    fn test_option_schema_serializes_string_type() {
        let route = Route::new("/hello/:name", noop).unwrap();
        let json = serde_json::to_value(derive_command(&route).unwrap()).unwrap();
        assert_eq!(json["options"][0]["type"], 3);
        assert_eq!(json["options"][0]["required"], true);
    }
}
