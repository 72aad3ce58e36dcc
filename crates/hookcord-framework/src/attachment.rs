//! Attachment detection from response headers.
//!
//! A handler response carrying `Content-Disposition: attachment` is delivered
//! as one uploaded file instead of streamed text. `Content-Type` and
//! `Content-Length` fill in the descriptor when present.

use hookcord_core::Attachment;
use hookcord_core::http::HeaderMap;
use hookcord_core::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use percent_encoding::percent_decode_str;

/// File name used when the disposition names none.
pub const DEFAULT_FILENAME: &str = "file";

/// Builds the attachment descriptor for a response, if it is one.
///
/// The descriptor is always ephemeral and refers to upload slot `0`.
pub fn attachment_from_headers(headers: &HeaderMap) -> Option<Attachment> {
    let disposition = headers.get(CONTENT_DISPOSITION)?.to_str().ok()?;
    let mut parts = disposition.split(';').map(str::trim);

    let kind = parts.next()?;
    if !kind.eq_ignore_ascii_case("attachment") {
        return None;
    }

    let mut plain = None;
    let mut extended = None;
    for part in parts {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "filename" => plain = Some(unquote(value).to_string()),
            "filename*" => extended = decode_extended(value),
            _ => {}
        }
    }

    let filename = extended
        .or(plain)
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string());

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let size = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok());

    Some(Attachment {
        id: 0,
        filename,
        content_type,
        size,
        ephemeral: true,
    })
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Decodes an RFC 5987 `charset'lang'value` parameter.
fn decode_extended(value: &str) -> Option<String> {
    let mut fields = value.splitn(3, '\'');
    let charset = fields.next()?;
    let _lang = fields.next()?;
    let encoded = fields.next()?;
    let decoded = percent_decode_str(encoded);
    if charset.eq_ignore_ascii_case("utf-8") {
        decoded.decode_utf8().ok().map(|s| s.into_owned())
    } else {
        Some(decoded.decode_utf8_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookcord_core::http::HeaderValue;

    fn headers(pairs: &[(hookcord_core::http::HeaderName, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(k.clone(), HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn test_full_descriptor() {
        let map = headers(&[
            (CONTENT_DISPOSITION, r#"attachment; filename="report.csv""#),
            (CONTENT_TYPE, "text/csv"),
            (CONTENT_LENGTH, "42"),
        ]);
        let attachment = attachment_from_headers(&map).unwrap();
        assert_eq!(attachment.id, 0);
        assert_eq!(attachment.filename, "report.csv");
        assert_eq!(attachment.content_type.as_deref(), Some("text/csv"));
        assert_eq!(attachment.size, Some(42));
        assert!(attachment.ephemeral);
    }

    #[test]
    fn test_extended_filename_wins() {
        let map = headers(&[(
            CONTENT_DISPOSITION,
            "attachment; filename=fallback.txt; filename*=UTF-8''r%C3%A9sum%C3%A9.txt",
        )]);
        assert_eq!(attachment_from_headers(&map).unwrap().filename, "résumé.txt");
    }

    #[test]
    fn test_defaults_and_non_attachments() {
        let map = headers(&[(CONTENT_DISPOSITION, "Attachment")]);
        let attachment = attachment_from_headers(&map).unwrap();
        assert_eq!(attachment.filename, DEFAULT_FILENAME);
        assert!(attachment.content_type.is_none());
        assert!(attachment.size.is_none());

        let inline = headers(&[(CONTENT_DISPOSITION, r#"inline; filename="a.txt""#)]);
        assert!(attachment_from_headers(&inline).is_none());
        assert!(attachment_from_headers(&HeaderMap::new()).is_none());
    }
}
