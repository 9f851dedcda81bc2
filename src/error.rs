//! Error types for the transcript-gpa library.
//!
//! Two distinct outcomes reflect two distinct failure modes:
//!
//! * [`LedgerError`] — returned as `Err` from the public entry points. Most
//!   variants are fatal (unreadable input, a subject line the grammar cannot
//!   make sense of). [`LedgerError::ZeroCredit`] is the exception: callers
//!   usually log it and still export whatever was parsed.
//!
//! * [`SkipReason`] — **Non-fatal**: a single line was not used (orphan
//!   subject line, page header, blank line). Stored inside
//!   [`crate::parser::ParseOutcome`] so callers can count and inspect skips
//!   rather than losing the whole transcript to a stray line.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the transcript-gpa library.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Transcript file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// A non-PDF input was not valid UTF-8 text.
    #[error("Could not decode '{path}' as UTF-8 text: {detail}")]
    TextDecodeFailed { path: PathBuf, detail: String },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Text extraction from PDF files needs a pdfium shared library.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (file or directory).\n\
  • Or install libpdfium system-wide.\n\
  • Or pass an already extracted plain-text transcript instead of the PDF.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Grammar errors ────────────────────────────────────────────────────
    /// A recognised subject line does not follow `CODE NAME… LP GRADE`.
    ///
    /// Aborts the whole parse: a malformed grade or credit field means the
    /// grammar no longer matches the document.
    #[error("Line {line_no}: cannot parse subject line '{line}': {detail} (token '{token}')")]
    Grammar {
        line_no: usize,
        line: String,
        token: String,
        detail: String,
    },

    // ── Calculation errors ────────────────────────────────────────────────
    /// No graded, non-discarded credit exists; there is nothing to average.
    #[error("Total credit points is zero, cannot calculate average")]
    ZeroCredit,

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A curriculum file could not be read or deserialised.
    #[error("Failed to load curriculum from '{path}': {detail}")]
    ConfigReadFailed { path: PathBuf, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the report file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The renderer failed while serialising rows.
    #[error("Report rendering failed: {0}")]
    ReportFailed(String),
}

impl LedgerError {
    /// True for errors after which a report can still be produced.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, LedgerError::ZeroCredit)
    }
}

/// Why a line did not contribute to the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkipReason {
    /// A subject-shaped line appeared before any area header.
    OrphanSubject,
    /// Neither an area header nor a subject line (headers, page footers, blanks).
    Unrecognized,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::OrphanSubject => f.write_str("subject line before any area header"),
            SkipReason::Unrecognized => f.write_str("unrecognised line"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grammar_display_names_line_and_token() {
        let e = LedgerError::Grammar {
            line_no: 7,
            line: "INF101 Intro 8 abc".into(),
            token: "abc".into(),
            detail: "grade is neither '--' nor a decimal".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("Line 7"), "got: {msg}");
        assert!(msg.contains("'abc'"), "got: {msg}");
        assert!(msg.contains("INF101 Intro 8 abc"), "got: {msg}");
    }

    #[test]
    fn zero_credit_is_recoverable() {
        assert!(LedgerError::ZeroCredit.is_recoverable());
        assert!(!LedgerError::InvalidConfig("x".into()).is_recoverable());
    }

    #[test]
    fn only_zero_credit_is_recoverable() {
        let p = || PathBuf::from("t.pdf");
        let fatal = [
            LedgerError::FileNotFound { path: p() },
            LedgerError::PermissionDenied { path: p() },
            LedgerError::TextDecodeFailed { path: p(), detail: "x".into() },
            LedgerError::CorruptPdf { path: p(), detail: "x".into() },
            LedgerError::PasswordRequired { path: p() },
            LedgerError::WrongPassword { path: p() },
            LedgerError::PdfiumBindingFailed("x".into()),
            LedgerError::InvalidConfig("x".into()),
            LedgerError::ConfigReadFailed { path: p(), detail: "x".into() },
            LedgerError::OutputWriteFailed {
                path: p(),
                source: std::io::Error::from(std::io::ErrorKind::Other),
            },
            LedgerError::ReportFailed("x".into()),
        ];
        for e in &fatal {
            assert!(!e.is_recoverable(), "{e:?}");
            // Exhaustive: a new variant has to be listed here.
            match e {
                LedgerError::FileNotFound { .. }
                | LedgerError::PermissionDenied { .. }
                | LedgerError::TextDecodeFailed { .. }
                | LedgerError::CorruptPdf { .. }
                | LedgerError::PasswordRequired { .. }
                | LedgerError::WrongPassword { .. }
                | LedgerError::PdfiumBindingFailed(_)
                | LedgerError::Grammar { .. }
                | LedgerError::ZeroCredit
                | LedgerError::InvalidConfig(_)
                | LedgerError::ConfigReadFailed { .. }
                | LedgerError::OutputWriteFailed { .. }
                | LedgerError::ReportFailed(_) => {}
            }
        }
    }

    #[test]
    fn file_not_found_display() {
        let e = LedgerError::FileNotFound {
            path: PathBuf::from("/tmp/missing.pdf"),
        };
        assert!(e.to_string().contains("/tmp/missing.pdf"));
    }

    #[test]
    fn skip_reason_display() {
        assert!(SkipReason::OrphanSubject.to_string().contains("before any area"));
        assert_eq!(SkipReason::Unrecognized.to_string(), "unrecognised line");
    }
}
