//! Text extraction: read the embedded text layer of each page via pdfium.
//!
//! No rendering or OCR happens here. A report exported from the assessment
//! tool carries a text layer; a scanned one does not, and is reported as
//! [`BriefingError::NoExtractableText`] so the caller can say so.
//!
//! pdfium wraps a C++ library with thread-local state, so the blocking work
//! is moved onto `spawn_blocking`.

use crate::error::BriefingError;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Separator placed between the text of consecutive non-empty pages.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Extract the text of every page of the PDF at `pdf_path`, in page order.
///
/// Pages whose text is empty or whitespace-only are skipped; the survivors
/// are joined with a blank line.
pub async fn extract_text(pdf_path: &Path) -> Result<String, BriefingError> {
    if !pdf_path.exists() {
        return Err(BriefingError::FileNotFound {
            path: pdf_path.to_path_buf(),
        });
    }

    let path = pdf_path.to_path_buf();
    tokio::task::spawn_blocking(move || extract_text_blocking(&path))
        .await
        .map_err(|e| BriefingError::Internal(format!("Extraction task panicked: {}", e)))?
}

/// Blocking implementation of text extraction.
fn extract_text_blocking(pdf_path: &Path) -> Result<String, BriefingError> {
    info!("Reading PDF: {}", pdf_path.display());
    let pdfium = bind_pdfium()?;

    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| BriefingError::UnreadablePdf {
            path: pdf_path.to_path_buf(),
            detail: format!("{:?}", e),
        })?;

    let pages = document.pages();
    debug!("PDF loaded: {} pages", pages.len());

    let texts = pages.iter().enumerate().map(|(idx, page)| {
        // A page whose text layer cannot be read counts as an empty page.
        let text = page.text().map(|t| t.all()).unwrap_or_default();
        debug!("Page {}: {} characters", idx + 1, text.chars().count());
        text
    });

    join_pages(texts, pdf_path)
}

/// Join page texts in order, dropping blank pages.
///
/// Fails with [`BriefingError::NoExtractableText`] when nothing survives.
pub fn join_pages<I>(pages: I, pdf_path: &Path) -> Result<String, BriefingError>
where
    I: IntoIterator<Item = String>,
{
    let kept: Vec<String> = pages
        .into_iter()
        .filter(|text| !text.trim().is_empty())
        .collect();

    if kept.is_empty() {
        return Err(BriefingError::NoExtractableText {
            path: pdf_path.to_path_buf(),
        });
    }

    Ok(kept.join(PAGE_SEPARATOR))
}

/// Bind to a pdfium shared library.
///
/// Resolution order (first match wins):
/// 1. `PDFIUM_LIB_PATH`, an explicit path to the library file
/// 2. the platform library name in the current directory
/// 3. the system library search path
pub fn bind_pdfium() -> Result<Pdfium, BriefingError> {
    if let Ok(explicit) = std::env::var("PDFIUM_LIB_PATH") {
        if !explicit.trim().is_empty() {
            let bindings = Pdfium::bind_to_library(explicit.clone()).map_err(|e| {
                BriefingError::PdfiumBindingFailed(format!("{}: {:?}", explicit, e))
            })?;
            return Ok(Pdfium::new(bindings));
        }
    }

    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| BriefingError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}
