//! Terminal-style text processing for streamed output.
//!
//! Handlers write plain text with a handful of control codes; the result is
//! what a terminal would show:
//!
//! | Input | Effect |
//! |-------|--------|
//! | `\x08` (backspace) | delete the previous character (a committed CRLF counts as one) |
//! | `\r\n` | commit the current line, CRLF included |
//! | `\r` | clear the current line |
//! | `\x0c` (form feed) | clear everything |
//! | anything else | append to the current line |
//!
//! The processor is meant to run over `previous_content + new_chunk`, so its
//! own output must be a fixed point. It is: the output only ever contains
//! CRLF pairs and ordinary characters.

/// Backspace.
pub const BACKSPACE: char = '\u{8}';

/// Form feed.
pub const FORM_FEED: char = '\u{c}';

/// Applies the control codes in `input` and returns the visible text.
pub fn apply_control_codes(input: &str) -> String {
    let mut committed = String::with_capacity(input.len());
    let mut line = String::new();
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            BACKSPACE => {
                if line.pop().is_none() {
                    if committed.ends_with("\r\n") {
                        committed.truncate(committed.len() - 2);
                    } else {
                        committed.pop();
                    }
                }
            }
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                committed.push_str(&line);
                committed.push_str("\r\n");
                line.clear();
            }
            '\r' => line.clear(),
            FORM_FEED => {
                committed.clear();
                line.clear();
            }
            other => line.push(other),
        }
    }

    committed.push_str(&line);
    committed
}

/// Returns the last `limit` characters of `text`.
pub fn tail_chars(text: &str, limit: usize) -> &str {
    let count = text.chars().count();
    if count <= limit {
        return text;
    }
    let skip = count - limit;
    match text.char_indices().nth(skip) {
        Some((idx, _)) => &text[idx..],
        None => "",
    }
}

/// Incremental UTF-8 decoder for chunked byte streams.
///
/// A character split across two chunks is held back until its remaining bytes
/// arrive. Invalid sequences are replaced with U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Creates an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `chunk`, keeping an incomplete trailing sequence for later.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let mut out = String::with_capacity(self.pending.len());
        let mut rest: &[u8] = &self.pending;

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    rest = &[];
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            rest = after;
                            break;
                        }
                    }
                }
            }
        }

        self.pending = rest.to_vec();
        out
    }

    /// Flushes any held-back bytes as replacement characters.
    pub fn finish(&mut self) -> String {
        let out = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_sequence() {
        // "ab" -> backspace -> "a" -> "ac" -> CRLF commits "ac\r\n"
        // " d" -> CR clears it -> "e" -> form feed clears all -> " f"
        assert_eq!(apply_control_codes("ab\u{8}c\r\n d\re\u{c} f"), " f");
    }

    #[test]
    fn test_sequence_without_form_feed() {
        assert_eq!(apply_control_codes("ab\u{8}c\r\n d\re"), "ac\r\ne");
    }

    #[test]
    fn test_backspace_crosses_line_start() {
        assert_eq!(apply_control_codes("ab\r\n\u{8}\u{8}"), "a");
    }

    #[test]
    fn test_backspace_on_empty() {
        assert_eq!(apply_control_codes("\u{8}x"), "x");
    }

    #[test]
    fn test_plain_newline_appends() {
        assert_eq!(apply_control_codes("a\nb"), "a\nb");
    }

    #[test]
    fn test_output_is_fixed_point() {
        let once = apply_control_codes("one\r\ntwo\rTWO\r\nthree\u{8}E");
        assert_eq!(once, "one\r\nTWO\r\nthreE");
        assert_eq!(apply_control_codes(&once), once);
    }

    #[test]
    fn test_progress_bar_rewrite() {
        let text = ["10%", "\r50%", "\r100%\r\n", "done"].concat();
        assert_eq!(apply_control_codes(&text), "100%\r\ndone");
    }

    #[test]
    fn test_tail_chars() {
        assert_eq!(tail_chars("abcdef", 3), "def");
        assert_eq!(tail_chars("abc", 5), "abc");
        assert_eq!(tail_chars("héllo wörld", 5), "wörld");
        assert_eq!(tail_chars("abc", 0), "");
    }

    #[test]
    fn test_decoder_split_multibyte() {
        let bytes = "hé!".as_bytes();
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(&bytes[..2]), "h");
        assert_eq!(decoder.decode(&bytes[2..]), "é!");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn test_decoder_invalid_byte() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"a\xffb"), "a\u{fffd}b");
    }

    #[test]
    fn test_decoder_finish_incomplete() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(&"é".as_bytes()[..1]), "");
        assert_eq!(decoder.finish(), "\u{fffd}");
    }
}
