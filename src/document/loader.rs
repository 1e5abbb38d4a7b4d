//! PDF page extraction using lopdf

use std::path::Path;
use std::path::PathBuf;

use lopdf::Document;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::document::document_digest;
use crate::errors::ChatPdfError;
use crate::errors::Result;
use crate::models::PageText;

/// Pages of one document plus its identity
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    /// SHA-256 hex digest of the file bytes
    pub source_id: String,
    /// One entry per page, in document order
    pub pages: Vec<PageText>,
}

impl LoadedDocument {
    /// Total extracted characters across all pages
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.pages.iter().map(|p| p.text.chars().count()).sum()
    }
}

/// Source of page-level text
pub trait DocumentLoader: Send + Sync {
    /// Read the document at `path`
    ///
    /// # Errors
    /// - `NotFound` when `path` does not exist
    /// - `Load` for unreadable, corrupt or encrypted files
    fn load(&self, path: &Path) -> Result<LoadedDocument>;
}

/// Extracts text from every page of a PDF file
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfLoader;

impl PdfLoader {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Text of every page. A page whose text cannot be decoded (an
    /// unsupported font encoding, say) is kept as an empty page so later
    /// page numbers stay correct.
    fn extract_pages(doc: &Document) -> Vec<PageText> {
        // get_pages is keyed by 1-indexed page number in document order
        let pages = doc.get_pages();
        let mut page_texts = Vec::with_capacity(pages.len());

        for &number in pages.keys() {
            let text = match doc.extract_text(&[number]) {
                Ok(text) => text,
                Err(e) => {
                    warn!("Page {}: text extraction failed, skipping: {}", number, e);
                    String::new()
                }
            };
            debug!("Page {}: {} chars extracted", number, text.len());
            page_texts.push(PageText::new(number, text));
        }

        page_texts
    }
}

impl DocumentLoader for PdfLoader {
    fn load(&self, path: &Path) -> Result<LoadedDocument> {
        if !path.exists() {
            return Err(ChatPdfError::NotFound(path.to_path_buf()));
        }

        let load_error = |source: lopdf::Error| ChatPdfError::Load {
            path: PathBuf::from(path),
            source,
        };

        let bytes = std::fs::read(path).map_err(|e| load_error(e.into()))?;
        let mut doc = Document::load_mem(&bytes).map_err(load_error)?;
        if doc.is_encrypted() {
            // Only files protected without a user password can be read
            doc.decrypt("").map_err(load_error)?;
        }
        let pages = Self::extract_pages(&doc);

        let document = LoadedDocument {
            source_id: document_digest(&bytes),
            pages,
        };
        info!(
            "Loaded {} ({} pages, {} chars)",
            path.display(),
            document.pages.len(),
            document.char_count()
        );

        Ok(document)
    }
}
