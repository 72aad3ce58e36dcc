//! Button extraction from `Link` response headers.
//!
//! Each entry follows the `<uri>; param=value` convention:
//!
//! ```text
//! Link: </hello/again>; title="Again", <https://example.com>; title=Docs; disabled
//! ```
//!
//! A URI starting with `/` becomes a custom-id button whose click is routed
//! back to that path; anything else becomes a link-style button.

use hookcord_core::http::HeaderMap;
use hookcord_core::http::header::LINK;
use hookcord_core::model::{Component, MAX_ROW_BUTTONS};
use tracing::warn;

/// One parsed `Link` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    /// Target URI.
    pub uri: String,
    /// Parameters in declared order, quotes removed.
    pub params: Vec<(String, String)>,
}

impl LinkEntry {
    /// Returns the first value of parameter `name`, case-insensitively.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Converts the entry into a button.
    pub fn to_button(&self) -> Component {
        let label = self.param("title").unwrap_or(&self.uri);
        let button = if self.uri.starts_with('/') {
            Component::custom_button(&self.uri, label)
        } else {
            Component::link_button(&self.uri, label)
        };
        let disabled = self
            .param("disabled")
            .is_some_and(|v| !v.eq_ignore_ascii_case("false"));
        button.disabled(disabled)
    }
}

/// Parses every `Link` header value into entries.
///
/// Malformed entries are skipped.
pub fn parse_link_headers(headers: &HeaderMap) -> Vec<LinkEntry> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| split_outside(v, ',').into_iter())
        .filter_map(parse_entry)
        .collect()
}

/// Builds the action row for a response, if its headers carry any links.
pub fn extract_buttons(headers: &HeaderMap) -> Option<Component> {
    let entries = parse_link_headers(headers);
    if entries.is_empty() {
        return None;
    }
    if entries.len() > MAX_ROW_BUTTONS {
        warn!(
            count = entries.len(),
            max = MAX_ROW_BUTTONS,
            "Too many Link entries, extra buttons dropped"
        );
    }
    let buttons = entries
        .iter()
        .take(MAX_ROW_BUTTONS)
        .map(LinkEntry::to_button)
        .collect();
    Some(Component::action_row(buttons))
}

fn parse_entry(raw: &str) -> Option<LinkEntry> {
    let raw = raw.trim();
    let rest = raw.strip_prefix('<')?;
    let close = rest.find('>')?;
    let uri = rest[..close].trim();
    if uri.is_empty() {
        return None;
    }

    let params = split_outside(&rest[close + 1..], ';')
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| match p.split_once('=') {
            Some((k, v)) => (k.trim().to_string(), unquote(v.trim()).to_string()),
            None => (p.to_string(), String::new()),
        })
        .collect();

    Some(LinkEntry {
        uri: uri.to_string(),
        params,
    })
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Splits on `sep` outside `<...>` and double quotes.
fn split_outside(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_uri = false;
    let mut in_quote = false;

    for (idx, ch) in input.char_indices() {
        match ch {
            '"' if !in_uri => in_quote = !in_quote,
            '<' if !in_quote => in_uri = true,
            '>' if !in_quote => in_uri = false,
            c if c == sep && !in_uri && !in_quote => {
                parts.push(&input[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookcord_core::http::HeaderValue;
    use hookcord_core::{ButtonStyle, ComponentKind};

    fn headers(values: &[&'static str]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for v in values {
            map.append(LINK, HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn test_local_and_external_buttons() {
        let map = headers(&[
            r#"</hello/again?age=3>; title="Again, please", <https://example.com/a,b>; title=Docs; disabled"#,
        ]);
        let row = extract_buttons(&map).unwrap();
        assert_eq!(row.kind, ComponentKind::ActionRow);
        assert_eq!(row.components.len(), 2);

        let local = &row.components[0];
        assert_eq!(local.style, Some(ButtonStyle::Primary));
        assert_eq!(local.custom_id.as_deref(), Some("/hello/again?age=3"));
        assert_eq!(local.label.as_deref(), Some("Again, please"));
        assert!(!local.disabled);

        let link = &row.components[1];
        assert_eq!(link.style, Some(ButtonStyle::Link));
        assert_eq!(link.url.as_deref(), Some("https://example.com/a,b"));
        assert_eq!(link.label.as_deref(), Some("Docs"));
        assert!(link.disabled);
    }

    #[test]
    fn test_label_falls_back_to_uri_and_disabled_false() {
        let map = headers(&["</ping>; disabled=false"]);
        let row = extract_buttons(&map).unwrap();
        assert_eq!(row.components[0].label.as_deref(), Some("/ping"));
        assert!(!row.components[0].disabled);
    }

    #[test]
    fn test_multiple_headers_and_row_limit() {
        let map = headers(&["</a>, </b>, </c>", "</d>, </e>, </f>", "garbage"]);
        assert_eq!(parse_link_headers(&map).len(), 6);
        let row = extract_buttons(&map).unwrap();
        assert_eq!(row.components.len(), MAX_ROW_BUTTONS);
        assert_eq!(row.components[4].custom_id.as_deref(), Some("/e"));
    }

    #[test]
    fn test_no_links() {
        assert!(extract_buttons(&HeaderMap::new()).is_none());
        assert!(extract_buttons(&headers(&["not a link"])).is_none());
    }
}
