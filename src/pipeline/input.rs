//! Input resolution: validate a user-supplied path and sniff its kind.
//!
//! A transcript arrives either as the original PDF or as text that was
//! already extracted by some other tool. The first four bytes decide:
//! `%PDF` goes through pdfium, everything else is read as UTF-8 text.

use crate::error::LedgerError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// How the transcript is stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Pdf,
    Text,
}

/// A validated, readable input file.
#[derive(Debug, Clone)]
pub struct ResolvedInput {
    pub path: PathBuf,
    pub kind: InputKind,
}

impl ResolvedInput {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Check that `path` exists and is readable, and decide whether it is a PDF.
pub fn resolve_input(path: impl AsRef<Path>) -> Result<ResolvedInput, LedgerError> {
    let path = path.as_ref().to_path_buf();

    if !path.exists() {
        return Err(LedgerError::FileNotFound { path });
    }

    let kind = match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic == b"%PDF" {
                InputKind::Pdf
            } else {
                InputKind::Text
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(LedgerError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(LedgerError::FileNotFound { path });
        }
    };

    debug!("Resolved {:?} input: {}", kind, path.display());
    Ok(ResolvedInput { path, kind })
}

/// Read a plain-text transcript.
pub fn read_text(path: &Path) -> Result<String, LedgerError> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => LedgerError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => LedgerError::FileNotFound {
            path: path.to_path_buf(),
        },
    })?;
    String::from_utf8(bytes).map_err(|e| LedgerError::TextDecodeFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}
