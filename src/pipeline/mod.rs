//! Pipeline stages that turn a transcript file into clean text lines.
//!
//! Each submodule implements exactly one transformation step.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ postprocess ──▶ parser
//! (path)    (pdfium /   (cleanup)       (crate::parser)
//!            UTF-8)
//! ```
//!
//! 1. [`input`]       — validate the path and sniff `%PDF` magic bytes
//! 2. [`extract`]     — read the pdfium text layer page by page, or the raw
//!    text of an already extracted transcript
//! 3. [`postprocess`] — deterministic text-cleanup rules (line endings,
//!    exotic spaces, invisible characters, whitespace runs)

pub mod extract;
pub mod input;
pub mod postprocess;
