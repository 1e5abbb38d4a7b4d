//! In-memory vector index over embedded passages

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;

use crate::embeddings::EmbeddingProvider;
use crate::errors::ChatPdfError;
use crate::errors::Result;
use crate::models::Passage;

/// Distance function used for ranking; fixed for the lifetime of an index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Euclidean distance
    #[default]
    L2,
    /// `1 - cosine similarity`
    Cosine,
}

impl DistanceMetric {
    /// Distance between two vectors of equal length; smaller is more similar
    #[must_use]
    pub fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::L2 => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f32>()
                .sqrt(),
            Self::Cosine => {
                let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
                let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
                let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
                if norm_a == 0.0 || norm_b == 0.0 {
                    return 1.0;
                }
                1.0 - dot / (norm_a * norm_b)
            }
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::L2 => write!(f, "l2"),
            Self::Cosine => write!(f, "cosine"),
        }
    }
}

/// A passage paired with its embedding
#[derive(Debug, Clone)]
pub struct EmbeddedPassage {
    pub passage: Passage,
    pub embedding: Vec<f32>,
}

/// One ranked hit from [`VectorIndex::search`]
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub passage: Passage,
    pub distance: f32,
}

/// Embedded passages of one document, searchable by nearest neighbour.
///
/// Every stored vector has the same dimension. The index is immutable once
/// built; re-ingesting a document builds a new one.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    entries: Vec<EmbeddedPassage>,
    dimension: usize,
    metric: DistanceMetric,
    source_id: String,
}

impl VectorIndex {
    /// Embed `passages` and build an index over them
    ///
    /// # Errors
    /// - `EmptyInput` when `passages` is empty
    /// - `Provider` when embedding fails or returns the wrong number of vectors
    /// - `DimensionMismatch` when the provider returns vectors of differing length
    pub async fn build(
        passages: Vec<Passage>,
        embedder: &dyn EmbeddingProvider,
        metric: DistanceMetric,
    ) -> Result<Self> {
        if passages.is_empty() {
            return Err(ChatPdfError::EmptyInput);
        }

        let texts: Vec<String> = passages.iter().map(|p| p.text.clone()).collect();
        debug!("Embedding {} passages", texts.len());
        let embeddings = embedder.embed(&texts).await?;

        Self::from_embeddings(passages, embeddings, metric)
    }

    /// Build an index from precomputed embeddings, one per passage
    ///
    /// # Errors
    /// Same conditions as [`VectorIndex::build`], minus embedding failures.
    pub fn from_embeddings(
        passages: Vec<Passage>,
        embeddings: Vec<Vec<f32>>,
        metric: DistanceMetric,
    ) -> Result<Self> {
        if passages.is_empty() {
            return Err(ChatPdfError::EmptyInput);
        }
        if embeddings.len() != passages.len() {
            return Err(ChatPdfError::Provider(format!(
                "Expected {} embeddings, received {}",
                passages.len(),
                embeddings.len()
            )));
        }

        let dimension = embeddings[0].len();
        if dimension == 0 {
            return Err(ChatPdfError::Provider(
                "Provider returned an empty embedding".to_string(),
            ));
        }
        if let Some(bad) = embeddings.iter().find(|e| e.len() != dimension) {
            return Err(ChatPdfError::DimensionMismatch {
                expected: dimension,
                actual: bad.len(),
            });
        }

        let source_id = passages[0].metadata.source_id.clone();
        let entries: Vec<EmbeddedPassage> = passages
            .into_iter()
            .zip(embeddings)
            .map(|(passage, embedding)| EmbeddedPassage { passage, embedding })
            .collect();

        info!(
            "Built {} index: {} passages, {} dimensions",
            metric,
            entries.len(),
            dimension
        );

        Ok(Self {
            entries,
            dimension,
            metric,
            source_id,
        })
    }

    /// Return up to `k` passages nearest to `query`, closest first.
    ///
    /// Ties keep insertion order.
    ///
    /// # Errors
    /// `DimensionMismatch` when `query` has a different dimension than the index.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if query.len() != self.dimension {
            return Err(ChatPdfError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (idx, self.metric.distance(query, &entry.embedding)))
            .collect();

        // sort_by is stable
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(idx, distance)| SearchResult {
                passage: self.entries[idx].passage.clone(),
                distance,
            })
            .collect())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub const fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Digest of the document this index was built from
    #[must_use]
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Passages in insertion order
    pub fn passages(&self) -> impl Iterator<Item = &Passage> {
        self.entries.iter().map(|e| &e.passage)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::errors::ErrorKind;
    use crate::models::PassageMetadata;

    fn passage(text: &str, idx: usize) -> Passage {
        Passage {
            text: text.to_string(),
            metadata: PassageMetadata {
                page: Some(1),
                source_id: "doc".to_string(),
                start_index: 0,
                chunk_index: idx,
            },
        }
    }

    fn passages(n: usize) -> Vec<Passage> {
        (0..n).map(|i| passage(&format!("passage {i}"), i)).collect()
    }

    /// Returns canned vectors regardless of input
    struct CannedEmbedder(Vec<Vec<f32>>);

    #[async_trait]
    impl EmbeddingProvider for CannedEmbedder {
        async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_l2_distance() {
        let d = DistanceMetric::L2.distance(&[0.0, 0.0], &[3.0, 4.0]);
        assert!((d - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_distance() {
        let same = DistanceMetric::Cosine.distance(&[1.0, 0.0], &[2.0, 0.0]);
        let orthogonal = DistanceMetric::Cosine.distance(&[1.0, 0.0], &[0.0, 1.0]);
        let zero = DistanceMetric::Cosine.distance(&[0.0, 0.0], &[1.0, 0.0]);

        assert!(same.abs() < 1e-6);
        assert!((orthogonal - 1.0).abs() < 1e-6);
        assert!((zero - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_search_orders_by_distance_and_truncates() {
        let index = VectorIndex::from_embeddings(
            passages(4),
            vec![
                vec![10.0, 0.0],
                vec![1.0, 0.0],
                vec![5.0, 0.0],
                vec![0.0, 0.0],
            ],
            DistanceMetric::L2,
        )
        .unwrap();

        let hits = index.search(&[0.0, 0.0], 3).unwrap();
        let order: Vec<usize> = hits.iter().map(|h| h.passage.metadata.chunk_index).collect();
        assert_eq!(order, vec![3, 1, 2]);
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let index = VectorIndex::from_embeddings(
            passages(3),
            vec![vec![1.0, 1.0], vec![1.0, 1.0], vec![1.0, 1.0]],
            DistanceMetric::L2,
        )
        .unwrap();

        let hits = index.search(&[0.0, 0.0], 3).unwrap();
        let order: Vec<usize> = hits.iter().map(|h| h.passage.metadata.chunk_index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_k_larger_than_index_returns_everything() {
        let index = VectorIndex::from_embeddings(
            passages(2),
            vec![vec![1.0], vec![2.0]],
            DistanceMetric::Cosine,
        )
        .unwrap();

        assert_eq!(index.search(&[1.0], 10).unwrap().len(), 2);
        assert!(index.search(&[1.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let index =
            VectorIndex::from_embeddings(passages(1), vec![vec![1.0, 2.0]], DistanceMetric::L2)
                .unwrap();

        let err = index.search(&[1.0, 2.0, 3.0], 1).unwrap_err();
        assert!(matches!(
            err,
            ChatPdfError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_ragged_embeddings_rejected() {
        let err = VectorIndex::from_embeddings(
            passages(2),
            vec![vec![1.0, 2.0], vec![1.0]],
            DistanceMetric::L2,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Provider);
    }

    #[tokio::test]
    async fn test_build_rejects_empty_input() {
        let embedder = CannedEmbedder(vec![]);
        let err = VectorIndex::build(vec![], &embedder, DistanceMetric::L2)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyInput);
    }

    #[tokio::test]
    async fn test_build_rejects_wrong_vector_count() {
        let embedder = CannedEmbedder(vec![vec![1.0]]);
        let err = VectorIndex::build(passages(2), &embedder, DistanceMetric::L2)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Provider);
    }

    #[tokio::test]
    async fn test_build_records_source_and_dimension() {
        let embedder = CannedEmbedder(vec![vec![0.1, 0.2, 0.3], vec![0.3, 0.2, 0.1]]);
        let index = VectorIndex::build(passages(2), &embedder, DistanceMetric::Cosine)
            .await
            .unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index.dimension(), 3);
        assert_eq!(index.metric(), DistanceMetric::Cosine);
        assert_eq!(index.source_id(), "doc");
        assert_eq!(index.passages().count(), 2);
    }
}
