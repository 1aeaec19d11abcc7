use std::sync::Arc;

use oraculo_llm::LlmProvider;

use crate::document::{Document, TextSplitter};
use crate::error::MemoryError;
use crate::store::InMemoryVectorStore;

/// Build-phase pipeline: split a document, embed every chunk in one batched
/// call, and insert the entries into the store.
pub struct IngestionPipeline<P> {
    splitter: TextSplitter,
    provider: Arc<P>,
}

impl<P: LlmProvider> IngestionPipeline<P> {
    pub fn new(splitter: TextSplitter, provider: Arc<P>) -> Self {
        Self { splitter, provider }
    }

    /// Ingest a document. Returns the number of chunks stored.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding fails or an embedding's dimension does
    /// not match the store's.
    pub async fn ingest(
        &self,
        document: &Document,
        store: &mut InMemoryVectorStore,
    ) -> Result<usize, MemoryError> {
        let chunks = self.splitter.split(document);
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.provider.embed_batch(&texts).await?;

        let count = chunks.len();
        for (chunk, embedding) in chunks.into_iter().zip(embeddings) {
            store.insert(chunk, embedding)?;
        }

        tracing::debug!(chunks = count, source = %document.metadata.source, "document ingested");
        Ok(count)
    }
}
