use uuid::Uuid;

use crate::document::Chunk;
use crate::error::StoreError;

#[derive(Debug, Clone)]
pub struct StoreEntry {
    pub id: Uuid,
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct ScoredEntry {
    pub id: Uuid,
    pub score: f32,
    pub chunk: Chunk,
}

/// Linear-scan vector index held entirely in process memory.
///
/// Insertion is additive (no deduplication). Search is cosine top-k with a
/// stable sort, so entries with equal similarity keep insertion order.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    entries: Vec<StoreEntry>,
}

impl InMemoryVectorStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store a chunk with its embedding.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DimensionMismatch` if the embedding's dimension
    /// differs from the dimension established by the first entry.
    pub fn insert(&mut self, chunk: Chunk, embedding: Vec<f32>) -> Result<(), StoreError> {
        if let Some(first) = self.entries.first()
            && first.embedding.len() != embedding.len()
        {
            return Err(StoreError::DimensionMismatch {
                expected: first.embedding.len(),
                got: embedding.len(),
            });
        }
        self.entries.push(StoreEntry {
            id: Uuid::new_v4(),
            chunk,
            embedding,
        });
        Ok(())
    }

    /// Return the `k` entries most similar to the query vector, most similar
    /// first. Returns all entries when the store holds fewer than `k`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Empty` when no entries have been inserted.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredEntry>, StoreError> {
        if self.entries.is_empty() {
            return Err(StoreError::Empty);
        }

        let mut scored: Vec<ScoredEntry> = self
            .entries
            .iter()
            .map(|e| ScoredEntry {
                id: e.id,
                score: cosine_similarity(query, &e.embedding),
                chunk: e.chunk.clone(),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);
        Ok(scored)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
