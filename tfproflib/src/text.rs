//! Terminal formatting removal.
//!
//! Unless `-no-color` is passed, Terraform decorates its output with ANSI
//! formatting directives. The parser only works on clean text, so the
//! driver strips them from every line first.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

// CSI-introduced control codes, either ESC-prefixed or as C1 bytes.
static ANSI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\x1B[@-_]|[\u{80}-\u{9F}])[0-?]*[ -/]*[@-~]").unwrap());

/// Remove ANSI terminal formatting from a line. Borrows when the line is
/// already clean.
pub fn strip_ansi(line: &str) -> Cow<'_, str> {
    if !line.bytes().any(|b| b == 0x1B || b >= 0x80) {
        return Cow::Borrowed(line);
    }
    ANSI.replace_all(line, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_line_is_borrowed() {
        let line = "aws_instance.web: Creating...";
        assert!(matches!(strip_ansi(line), Cow::Borrowed(_)));
    }

    #[test]
    fn test_strips_color_codes() {
        let line = "\x1b[1maws_instance.web: Creating...\x1b[0m";
        assert_eq!(strip_ansi(line), "aws_instance.web: Creating...");
    }

    #[test]
    fn test_strips_codes_mid_line() {
        let line = "aws_instance.web: \x1b[32mCreation complete\x1b[0m after 10s";
        assert_eq!(strip_ansi(line), "aws_instance.web: Creation complete after 10s");
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(strip_ansi(""), "");
    }
}
