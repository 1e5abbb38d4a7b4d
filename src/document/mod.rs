//! Document ingestion: PDF page extraction and passage chunking
//!
//! The loader turns a PDF on disk into ordered page texts; the chunker turns
//! page texts into overlapping passages sized for embedding.

pub mod chunker;
pub mod loader;

pub use chunker::Chunk;
pub use chunker::Chunker;
pub use chunker::ChunkingConfig;
pub use loader::DocumentLoader;
pub use loader::LoadedDocument;
pub use loader::PdfLoader;

use sha2::Digest;
use sha2::Sha256;

/// Stable identity of a document: SHA-256 of its bytes, hex encoded
#[must_use]
pub fn document_digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_stable_and_content_sensitive() {
        let a = document_digest(b"%PDF-1.5 same bytes");
        let b = document_digest(b"%PDF-1.5 same bytes");
        let c = document_digest(b"%PDF-1.5 other bytes");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }
}
