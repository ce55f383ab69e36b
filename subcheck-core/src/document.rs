//! Plain-text extraction from submitted PDF and DOCX files.
//!
//! Text is reduced to sentence-like chunks by splitting on literal `.`
//! characters; this is a heuristic, not sentence segmentation.

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use docx_rs::{DocumentChild, Paragraph, ParagraphChild, RunChild};

use crate::error::{Result, SubcheckError};

/// Chunks at or below this many characters are dropped.
pub const MIN_CHUNK_CHARS: usize = 10;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("pdf") {
            Some(DocumentKind::Pdf)
        } else if ext.eq_ignore_ascii_case("docx") {
            Some(DocumentKind::Docx)
        } else {
            None
        }
    }
}

/// True for filenames the scanner reads.
pub fn is_scannable(name: &str) -> bool {
    DocumentKind::from_path(Path::new(name)).is_some()
}

/// Full text of a document; empty for unsupported extensions.
pub fn read_text(path: &Path) -> Result<String> {
    let Some(kind) = DocumentKind::from_path(path) else {
        return Ok(String::new());
    };
    let bytes = fs::read(path).map_err(|e| unreadable(path, e.to_string()))?;
    let text = match kind {
        DocumentKind::Pdf => pdf_text(&bytes),
        DocumentKind::Docx => docx_text(&bytes),
    };
    text.map_err(|reason| unreadable(path, reason))
}

/// Chunks of a document. Read failures are logged and yield no chunks.
pub fn extract_chunks(path: &Path) -> Vec<String> {
    match read_text(path) {
        Ok(text) => split_chunks(&text),
        Err(e) => {
            tracing::warn!("{e}");
            Vec::new()
        }
    }
}

pub fn split_chunks(text: &str) -> Vec<String> {
    text.split('.')
        .map(str::trim)
        .filter(|s| s.chars().count() > MIN_CHUNK_CHARS)
        .map(str::to_string)
        .collect()
}

fn unreadable(path: &Path, reason: String) -> SubcheckError {
    SubcheckError::UnreadableDocument {
        path: path.file_name().map(Into::into).unwrap_or_else(|| path.to_path_buf()),
        reason,
    }
}

/// All pages in order.
pub fn pdf_text(bytes: &[u8]) -> std::result::Result<String, String> {
    // pdf-extract panics on some malformed inputs instead of returning an error.
    match panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes))) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err("PDF parser panicked".to_string()),
    }
}

/// Body paragraphs in order, each followed by a newline.
pub fn docx_text(bytes: &[u8]) -> std::result::Result<String, String> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| e.to_string())?;
    let mut text = String::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(para) = child {
            text.push_str(&paragraph_text(para));
            text.push('\n');
        }
    }
    Ok(text)
}

fn paragraph_text(para: &Paragraph) -> String {
    let mut out = String::new();
    collect_runs(&para.children, &mut out);
    out
}

fn collect_runs(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for rc in &run.children {
                    match rc {
                        RunChild::Text(t) => out.push_str(&t.text),
                        RunChild::Tab(_) => out.push('\t'),
                        RunChild::Break(_) => out.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => collect_runs(&link.children, out),
            _ => {}
        }
    }
}
