//! Post-processing: deterministic cleanup of extracted transcript text.
//!
//! PDF text extraction reproduces what is on the page, including artefacts
//! that break exact header matching:
//!
//! - Windows-style `\r\n` or bare `\r` line endings
//! - non-breaking and other fixed-width spaces between words
//! - zero-width characters, byte-order marks and soft hyphens
//! - runs of spaces or tabs where the layout used column alignment
//!
//! Rules must run in this order: normalise line endings before working per
//! line, and turn exotic spaces into plain ones before collapsing runs.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to extracted text.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Replace non-breaking and fixed-width spaces with a plain space
/// 3. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens, etc.)
/// 4. Collapse runs of horizontal whitespace to a single space
/// 5. Trim trailing whitespace per line
pub fn clean_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = normalise_spaces(&s);
    let s = remove_invisible_chars(&s);
    let s = collapse_horizontal_whitespace(&s);
    trim_trailing_whitespace(&s)
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Exotic spaces ────────────────────────────────────────────────────

fn normalise_spaces(input: &str) -> String {
    input.replace(['\u{00A0}', '\u{2007}', '\u{202F}', '\u{2009}'], " ")
}

// ── Rule 3: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 4: Collapse horizontal whitespace ───────────────────────────────────

static RE_HSPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\x0C]{2,}|\t").unwrap());

fn collapse_horizontal_whitespace(input: &str) -> String {
    RE_HSPACE.replace_all(input, " ").to_string()
}

// ── Rule 5: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalise_line_endings() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_normalise_spaces() {
        assert_eq!(normalise_spaces("INF101\u{00A0}Intro"), "INF101 Intro");
    }

    #[test]
    fn test_remove_invisible() {
        let input = "hello\u{200B}world\u{FEFF}foo\u{00AD}bar";
        assert_eq!(remove_invisible_chars(input), "helloworldfoobar");
    }

    #[test]
    fn test_collapse_horizontal_whitespace() {
        assert_eq!(
            collapse_horizontal_whitespace("Mathematische   Grundlagen\tx"),
            "Mathematische Grundlagen x"
        );
        assert_eq!(collapse_horizontal_whitespace("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_trim_trailing_whitespace() {
        assert_eq!(
            trim_trailing_whitespace("  hello   \nworld  "),
            "  hello\nworld"
        );
    }

    #[test]
    fn test_clean_text_full_pipeline() {
        let input = "\u{FEFF}Mathematische\u{00A0} Grundlagen \r\nMTH1  Analysis\u{200B} I   9  2,3\r\n";
        assert_eq!(
            clean_text(input),
            "Mathematische Grundlagen\nMTH1 Analysis I 9 2,3"
        );
    }
}
