//! Per-user conversation state

use crate::rag::VectorIndex;

/// Holds the index of the document currently loaded, if any.
///
/// A session starts empty. A successful ingest replaces its index; a failed
/// ingest leaves it untouched.
#[derive(Debug, Default)]
pub struct Session {
    index: Option<VectorIndex>,
    document_name: Option<String>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a document has been ingested
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.index.is_some()
    }

    /// Whether the loaded document has the given digest
    #[must_use]
    pub fn is_loaded(&self, source_id: &str) -> bool {
        self.index
            .as_ref()
            .is_some_and(|index| index.source_id() == source_id)
    }

    #[must_use]
    pub const fn index(&self) -> Option<&VectorIndex> {
        self.index.as_ref()
    }

    /// Display name of the loaded document
    #[must_use]
    pub fn document_name(&self) -> Option<&str> {
        self.document_name.as_deref()
    }

    pub(crate) fn replace(&mut self, index: VectorIndex, document_name: String) -> &VectorIndex {
        self.document_name = Some(document_name);
        self.index.insert(index)
    }

    /// Forget the loaded document
    pub fn clear(&mut self) {
        self.index = None;
        self.document_name = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Passage;
    use crate::models::PassageMetadata;
    use crate::rag::DistanceMetric;

    fn index(source_id: &str) -> VectorIndex {
        let passage = Passage {
            text: "text".to_string(),
            metadata: PassageMetadata {
                page: Some(1),
                source_id: source_id.to_string(),
                start_index: 0,
                chunk_index: 0,
            },
        };
        VectorIndex::from_embeddings(vec![passage], vec![vec![1.0]], DistanceMetric::L2).unwrap()
    }

    #[test]
    fn test_new_session_is_not_ready() {
        let session = Session::new();
        assert!(!session.is_ready());
        assert!(session.index().is_none());
        assert!(session.document_name().is_none());
    }

    #[test]
    fn test_replace_and_clear() {
        let mut session = Session::new();
        session.replace(index("abc"), "report.pdf".to_string());

        assert!(session.is_ready());
        assert!(session.is_loaded("abc"));
        assert!(!session.is_loaded("def"));
        assert_eq!(session.document_name(), Some("report.pdf"));

        session.clear();
        assert!(!session.is_ready());
    }
}
