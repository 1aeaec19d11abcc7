use std::sync::Arc;

use oraculo_llm::LlmProvider;

use crate::error::MemoryError;
use crate::store::InMemoryVectorStore;

/// Query-phase composition of embedder and store: embeds the query, searches
/// with a fixed `top_k`, and returns the matched chunks' text in score order.
pub struct Retriever<P> {
    store: Arc<InMemoryVectorStore>,
    provider: Arc<P>,
    top_k: usize,
}

impl<P: LlmProvider> Retriever<P> {
    pub fn new(store: Arc<InMemoryVectorStore>, provider: Arc<P>, top_k: usize) -> Self {
        Self {
            store,
            provider,
            top_k,
        }
    }

    #[must_use]
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// # Errors
    ///
    /// Returns an error if the query embedding fails or the store is empty.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<String>, MemoryError> {
        let query_vector = self.provider.embed(query).await?;
        let hits = self.store.search(&query_vector, self.top_k)?;

        tracing::debug!(query, hits = hits.len(), "retrieved chunks");

        Ok(hits.into_iter().map(|h| h.chunk.content).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Chunk, DocumentMetadata};
    use crate::error::StoreError;
    use oraculo_llm::mock::MockProvider;

    fn chunk(content: &str) -> Chunk {
        Chunk {
            content: content.to_owned(),
            start_offset: 0,
            metadata: DocumentMetadata {
                source: "test".to_owned(),
                content_type: "text/plain".to_owned(),
            },
        }
    }

    fn store_with(texts: &[&str], provider: &MockProvider) -> InMemoryVectorStore {
        let mut store = InMemoryVectorStore::new();
        for text in texts {
            let embedding = MockProvider::embed_text(text, provider.embedding_dim);
            store.insert(chunk(text), embedding).unwrap();
        }
        store
    }

    #[tokio::test]
    async fn retrieve_returns_top_k_texts() {
        let provider = MockProvider::default();
        let store = store_with(
            &["sobre gatos", "sobre cachorros", "sobre pássaros", "sobre peixes"],
            &provider,
        );
        let retriever = Retriever::new(Arc::new(store), Arc::new(provider), 3);

        let results = retriever.retrieve("alguma pergunta").await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn retrieve_exact_match_ranks_first() {
        let provider = MockProvider::default();
        let store = store_with(&["texto alfa", "texto beta", "texto gama"], &provider);
        let retriever = Retriever::new(Arc::new(store), Arc::new(provider), 3);

        // the query embedding equals the stored embedding for the same text
        let results = retriever.retrieve("texto beta").await.unwrap();
        assert_eq!(results[0], "texto beta");
    }

    #[tokio::test]
    async fn retrieve_is_deterministic() {
        let provider = MockProvider::default();
        let store = store_with(&["um", "dois", "três", "quatro", "cinco"], &provider);
        let retriever = Retriever::new(Arc::new(store), Arc::new(provider), 3);

        let first = retriever.retrieve("pergunta fixa").await.unwrap();
        let second = retriever.retrieve("pergunta fixa").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn retrieve_fewer_entries_than_k() {
        let provider = MockProvider::default();
        let store = store_with(&["único"], &provider);
        let retriever = Retriever::new(Arc::new(store), Arc::new(provider), 3);

        let results = retriever.retrieve("pergunta").await.unwrap();
        assert_eq!(results, vec!["único".to_owned()]);
    }

    #[tokio::test]
    async fn retrieve_empty_store_errors() {
        let retriever = Retriever::new(
            Arc::new(InMemoryVectorStore::new()),
            Arc::new(MockProvider::default()),
            3,
        );
        let result = retriever.retrieve("pergunta").await;
        assert!(matches!(
            result,
            Err(MemoryError::Store(StoreError::Empty))
        ));
    }

    #[tokio::test]
    async fn retrieve_embedding_failure_propagates() {
        let provider = MockProvider::default();
        let store = store_with(&["algo"], &provider);
        let retriever = Retriever::new(
            Arc::new(store),
            Arc::new(MockProvider::failing_embed()),
            3,
        );
        let result = retriever.retrieve("pergunta").await;
        assert!(matches!(result, Err(MemoryError::Embedding(_))));
    }
}
