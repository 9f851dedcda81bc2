//! Text extraction: turn a transcript file into cleaned text lines.
//!
//! PDFs are read page by page through pdfium's text layer
//! ([`PdfPageText::all`]), so no layout analysis happens here; the parser
//! copes with whatever line order the PDF producer chose. Plain-text inputs
//! are read as-is. Both paths end in [`postprocess::clean_text`].
//!
//! pdfium is bound at call time: from `PDFIUM_LIB_PATH` (a library file or
//! the directory containing it) when set, otherwise from the system library
//! search path.

use crate::error::LedgerError;
use crate::pipeline::input::{self, InputKind};
use crate::pipeline::postprocess;
use crate::progress::ProgressCallback;
use pdfium_render::prelude::*;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

/// Environment variable naming a pdfium library file or directory.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Options for [`extract_text`].
#[derive(Clone, Default)]
pub struct ExtractOptions {
    /// PDF user password for encrypted transcripts.
    pub password: Option<String>,
    /// Per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for ExtractOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractOptions")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

/// Extract cleaned text from a PDF or plain-text transcript.
///
/// A document without a text layer yields an empty string, which parses to
/// an empty transcript.
pub fn extract_text(path: impl AsRef<Path>, options: &ExtractOptions) -> Result<String, LedgerError> {
    let resolved = input::resolve_input(path)?;
    let raw = match resolved.kind {
        InputKind::Pdf => extract_pdf_text(resolved.path(), options)?,
        InputKind::Text => input::read_text(resolved.path())?,
    };
    let cleaned = postprocess::clean_text(&raw);
    info!(
        "Extracted {} lines from {}",
        cleaned.lines().count(),
        resolved.path().display()
    );
    Ok(cleaned)
}

/// Bind pdfium from `PDFIUM_LIB_PATH` or the system library path.
pub fn bind_pdfium() -> Result<Pdfium, LedgerError> {
    let bindings = match std::env::var(PDFIUM_LIB_PATH_ENV) {
        Ok(p) if !p.trim().is_empty() => {
            let path = Path::new(p.trim());
            let lib = if path.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(path)
            } else {
                path.to_path_buf()
            };
            debug!("Binding pdfium from {}", lib.display());
            Pdfium::bind_to_library(&lib)
        }
        _ => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| LedgerError::PdfiumBindingFailed(format!("{:?}", e)))?;
    Ok(Pdfium::new(bindings))
}

/// Read every page's text layer, joined with newlines.
fn extract_pdf_text(pdf_path: &Path, options: &ExtractOptions) -> Result<String, LedgerError> {
    let pdfium = bind_pdfium()?;
    let password = options.password.as_deref();

    let document = pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                LedgerError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                LedgerError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            LedgerError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    if let Some(ref cb) = options.progress_callback {
        cb.on_extraction_start(total_pages);
    }

    let mut text = String::new();
    let mut total_lines = 0usize;

    for (idx, page) in pages.iter().enumerate() {
        let page_num = idx + 1;
        let page_text = match page.text() {
            Ok(t) => t.all(),
            Err(e) => {
                warn!("No text layer on page {}: {:?}", page_num, e);
                String::new()
            }
        };

        if page_text.trim().is_empty() {
            if let Some(ref cb) = options.progress_callback {
                cb.on_page_empty(page_num, total_pages);
            }
            continue;
        }

        let line_count = page_text.lines().count();
        total_lines += line_count;
        debug!("Page {} → {} lines", page_num, line_count);
        if let Some(ref cb) = options.progress_callback {
            cb.on_page_extracted(page_num, total_pages, line_count);
        }

        text.push_str(&page_text);
        text.push('\n');
    }

    if let Some(ref cb) = options.progress_callback {
        cb.on_extraction_complete(total_pages, total_lines);
    }

    Ok(text)
}
