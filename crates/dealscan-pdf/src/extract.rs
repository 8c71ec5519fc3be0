//! Page loop: bytes → page-delimited text

use crate::error::PdfError;
use crate::source::PageSource;
use lopdf::Document;
use tracing::{debug, warn};

/// Outcome of reading one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// 1-based page number
    pub number: u32,
    /// Page text, or the error detail if the page could not be read
    pub text: Result<String, String>,
}

impl PageText {
    /// Whether the page was read successfully
    pub fn is_ok(&self) -> bool {
        self.text.is_ok()
    }

    /// Render this page's block: header line, then text or error marker
    pub fn render(&self) -> String {
        match &self.text {
            Ok(text) => format!("--- Page {} ---\n{}\n", self.number, text),
            Err(detail) => format!(
                "--- Page {} ---\n[Error extracting page {}: {}]\n",
                self.number, self.number, detail
            ),
        }
    }
}

/// Open PDF bytes as a page source
///
/// # Errors
///
/// Returns [`PdfError::UnreadableDocument`] if the bytes are not a PDF
/// lopdf can open.
pub fn open(pdf_bytes: &[u8]) -> Result<Document, PdfError> {
    Document::load_mem(pdf_bytes).map_err(|e| PdfError::UnreadableDocument(e.to_string()))
}

/// Read every page of `source` in order, recording per-page failures
pub fn extract_pages<S: PageSource + ?Sized>(source: &S) -> Vec<PageText> {
    source
        .page_numbers()
        .into_iter()
        .map(|number| {
            let text = source.page_text(number);
            if let Err(detail) = &text {
                warn!(page = number, "Failed to extract page text: {}", detail);
            }
            PageText { number, text }
        })
        .collect()
}

/// Join page blocks and trim the result
pub fn render_pages(pages: &[PageText]) -> String {
    let mut text = String::new();
    for page in pages {
        text.push_str(&page.render());
    }
    text.trim().to_string()
}

/// Extract page-delimited plain text from PDF bytes
///
/// Each page contributes `--- Page N ---` followed by its text. A page
/// that fails contributes an `[Error extracting page N: ...]` marker and
/// the loop continues. A document without pages yields an empty string.
///
/// This is CPU-bound; async callers should run it on a blocking thread.
///
/// # Errors
///
/// Returns [`PdfError::UnreadableDocument`] only if the document itself
/// cannot be opened.
pub fn extract_text(pdf_bytes: &[u8]) -> Result<String, PdfError> {
    let document = open(pdf_bytes)?;
    let pages = extract_pages(&document);

    let failed = pages.iter().filter(|p| !p.is_ok()).count();
    debug!(
        bytes = pdf_bytes.len(),
        pages = pages.len(),
        failed,
        "Extracted PDF text"
    );

    Ok(render_pages(&pages))
}
