use std::io::Write as _;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use oraculo_llm::provider::{Message, Role};
use oraculo_llm::{LlmError, LlmProvider};
use oraculo_memory::{MemoryError, Retriever};

use crate::prompt::PromptTemplate;

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("retrieval failed: {0}")]
    Retrieval(#[from] MemoryError),

    #[error("generation failed: {0}")]
    Generation(#[from] LlmError),
}

/// Question-answering loop over an already-built index: a fixed demo pass,
/// then an interactive read-answer loop until a sentinel input.
pub struct Agent<P> {
    retriever: Retriever<P>,
    provider: Arc<P>,
    prompt: PromptTemplate,
    demo_questions: Vec<String>,
}

impl<P: LlmProvider> Agent<P> {
    pub fn new(
        retriever: Retriever<P>,
        provider: Arc<P>,
        prompt: PromptTemplate,
        demo_questions: Vec<String>,
    ) -> Self {
        Self {
            retriever,
            provider,
            prompt,
            demo_questions,
        }
    }

    /// Retrieve context for the question and generate a grounded answer.
    ///
    /// # Errors
    ///
    /// Returns an error when retrieval or generation fails. Callers in the
    /// run loops catch and report it without aborting.
    pub async fn answer(&self, question: &str) -> Result<String, AgentError> {
        self.answer_question(question, false).await
    }

    async fn answer_question(&self, question: &str, narrate: bool) -> Result<String, AgentError> {
        let chunks = self.retriever.retrieve(question).await?;
        if narrate {
            println!("Recuperados {} trecho(s) relevantes", chunks.len());
            println!("\nGerando resposta...");
        }

        let prompt = self.prompt.render(&chunks, question);
        let answer = self
            .provider
            .chat(&[Message::new(Role::User, prompt)])
            .await?;
        Ok(answer)
    }

    /// Answer the configured demo questions in order. A failure on one
    /// question is reported and the loop moves on to the next.
    pub async fn run_batch(&self) {
        if self.demo_questions.is_empty() {
            return;
        }

        println!("\n{}", "=".repeat(80));
        println!("CONSULTAS DE DEMONSTRAÇÃO");
        println!("{}", "=".repeat(80));

        for (i, question) in self.demo_questions.iter().enumerate() {
            println!("\nPERGUNTA {}: {question}\n", i + 1);

            match self.answer_question(question, true).await {
                Ok(answer) => println!("\nRESPOSTA:\n{answer}"),
                Err(e) => {
                    tracing::error!("demo question failed: {e:#}");
                    println!("Erro: {e:#}");
                }
            }

            println!("\n{}", "-".repeat(80));
        }

        println!("\nConsultas de demonstração concluídas.");
    }

    /// Read questions line by line until a sentinel input or EOF. Per-query
    /// errors are reported and the loop continues.
    ///
    /// # Errors
    ///
    /// Returns an error only when reading from `reader` fails.
    pub async fn run_interactive<R>(&self, reader: R) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        println!("\n{}", "=".repeat(80));
        println!("MODO INTERATIVO");
        println!("{}", "=".repeat(80));
        println!("Digite suas perguntas (ou 'sair' para encerrar)\n");

        let mut lines = reader.lines();
        loop {
            print!("Você: ");
            let _ = std::io::stdout().flush();

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let question = line.trim();

            if is_exit_command(question) {
                break;
            }

            println!("\nProcessando...\n");
            match self.answer(question).await {
                Ok(answer) => {
                    println!("Assistente: {answer}\n");
                    println!("{}\n", "-".repeat(80));
                }
                Err(e) => {
                    tracing::warn!("interactive question failed: {e:#}");
                    println!("Erro: {e:#}\n");
                }
            }
        }

        println!("\nEncerrando...");
        Ok(())
    }
}

/// Sentinel inputs that end the interactive loop, compared case-insensitively
/// after trimming.
fn is_exit_command(input: &str) -> bool {
    input.is_empty() || ["sair", "exit", "quit"].contains(&input.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use oraculo_llm::mock::MockProvider;
    use oraculo_memory::InMemoryVectorStore;
    use oraculo_memory::document::{Chunk, DocumentMetadata};

    fn store_with(texts: &[&str]) -> InMemoryVectorStore {
        let mut store = InMemoryVectorStore::new();
        for text in texts {
            let embedding = MockProvider::embed_text(text, 8);
            store
                .insert(
                    Chunk {
                        content: (*text).to_owned(),
                        start_offset: 0,
                        metadata: DocumentMetadata {
                            source: "test".to_owned(),
                            content_type: "text/plain".to_owned(),
                        },
                    },
                    embedding,
                )
                .unwrap();
        }
        store
    }

    fn make_agent(provider: MockProvider, demo_questions: Vec<String>) -> Agent<MockProvider> {
        let provider = Arc::new(provider);
        let store = Arc::new(store_with(&["trecho um", "trecho dois", "trecho três"]));
        let retriever = Retriever::new(store, provider.clone(), 3);
        Agent::new(retriever, provider, PromptTemplate::default(), demo_questions)
    }

    #[test]
    fn exit_commands_detected() {
        assert!(is_exit_command(""));
        assert!(is_exit_command("sair"));
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("quit"));
        assert!(is_exit_command("SAIR"));
        assert!(is_exit_command("Quit"));
    }

    #[test]
    fn ordinary_questions_not_exit_commands() {
        assert!(!is_exit_command("o que é RAG?"));
        assert!(!is_exit_command("sair da empresa é difícil?"));
    }

    #[tokio::test]
    async fn answer_returns_generated_text() {
        let agent = make_agent(
            MockProvider::with_responses(vec!["resposta gerada".into()]),
            vec![],
        );
        let answer = agent.answer("qual trecho?").await.unwrap();
        assert_eq!(answer, "resposta gerada");
    }

    #[tokio::test]
    async fn answer_generation_failure_surfaces() {
        let agent = make_agent(MockProvider::failing(), vec![]);
        let result = agent.answer("pergunta").await;
        assert!(matches!(result, Err(AgentError::Generation(_))));
    }

    #[tokio::test]
    async fn run_batch_survives_failing_provider() {
        let agent = make_agent(
            MockProvider::failing(),
            vec!["primeira".into(), "segunda".into()],
        );
        // both questions fail; the loop must still complete
        agent.run_batch().await;
    }

    #[tokio::test]
    async fn run_batch_with_no_questions_is_noop() {
        let agent = make_agent(MockProvider::default(), vec![]);
        agent.run_batch().await;
    }

    #[tokio::test]
    async fn interactive_answers_then_stops_at_sentinel() {
        let provider = MockProvider::with_responses(vec!["resposta enlatada".into()]);
        let agent = make_agent(provider.clone(), vec![]);

        let input: &[u8] = b"uma pergunta qualquer\nsair\n";
        agent.run_interactive(input).await.unwrap();

        // the canned response was consumed by the one answered question
        assert_eq!(provider.chat(&[]).await.unwrap(), "mock response");
    }

    #[tokio::test]
    async fn interactive_sentinel_first_skips_generation() {
        let provider = MockProvider::with_responses(vec!["intocada".into()]);
        let agent = make_agent(provider.clone(), vec![]);

        let input: &[u8] = b"sair\n";
        agent.run_interactive(input).await.unwrap();

        // no question was processed, the canned response is still queued
        assert_eq!(provider.chat(&[]).await.unwrap(), "intocada");
    }

    #[tokio::test]
    async fn interactive_empty_line_terminates() {
        let provider = MockProvider::with_responses(vec!["intocada".into()]);
        let agent = make_agent(provider.clone(), vec![]);

        let input: &[u8] = b"\nsegue ignorado\n";
        agent.run_interactive(input).await.unwrap();
        assert_eq!(provider.chat(&[]).await.unwrap(), "intocada");
    }

    #[tokio::test]
    async fn interactive_eof_terminates() {
        let agent = make_agent(MockProvider::default(), vec![]);
        let input: &[u8] = b"";
        agent.run_interactive(input).await.unwrap();
    }

    #[tokio::test]
    async fn interactive_continues_after_error() {
        let provider = MockProvider::failing();
        let agent = make_agent(provider, vec![]);

        // two failing questions, then sentinel; the loop must not abort early
        let input: &[u8] = b"primeira\nsegunda\nsair\n";
        agent.run_interactive(input).await.unwrap();
    }
}
