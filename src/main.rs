use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::BufReader;

use oraculo_core::agent::Agent;
use oraculo_core::config::Config;
use oraculo_core::prompt::PromptTemplate;
use oraculo_llm::mistral::MistralProvider;
use oraculo_memory::document::{SplitterConfig, TextSplitter, WebLoader};
use oraculo_memory::{IngestionPipeline, InMemoryVectorStore, Retriever};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_subscriber();

    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("no .env file loaded: {e}");
    }

    let config_path = resolve_config_path();
    let mut config = Config::load(&config_path)?;
    config.validate()?;
    config.api_key = Config::api_key_from_env();

    let api_key = config
        .api_key
        .as_ref()
        .context("ORACULO_API_KEY (or MISTRAL_API_KEY) must be set")?;

    println!("oraculo v{}", env!("CARGO_PKG_VERSION"));

    println!("\nInicializando modelos...");
    let provider = Arc::new(MistralProvider::new(
        api_key.expose().to_owned(),
        config.llm.base_url.clone(),
        config.llm.model.clone(),
        config.llm.embedding_model.clone(),
        config.llm.max_tokens,
        config.llm.temperature,
    ));
    println!("Modelos inicializados ({})", config.llm.model);

    println!("\nCarregando documento...");
    let loader = WebLoader::new(&config.document.selectors, config.document.max_body_bytes);
    let document = loader
        .load(&config.document.url)
        .await
        .context("failed to load source document")?;
    println!(
        "Documento carregado: {} caracteres",
        document.content.chars().count()
    );

    println!("\nDividindo e indexando documento...");
    let splitter = TextSplitter::new(SplitterConfig {
        chunk_size: config.splitter.chunk_size,
        chunk_overlap: config.splitter.chunk_overlap,
        sentence_aware: config.splitter.sentence_aware,
    });
    let pipeline = IngestionPipeline::new(splitter, provider.clone());
    let mut store = InMemoryVectorStore::new();
    let chunk_count = pipeline
        .ingest(&document, &mut store)
        .await
        .context("failed to index source document")?;
    println!("{chunk_count} chunks indexados");

    let retriever = Retriever::new(Arc::new(store), provider.clone(), config.retrieval.top_k);
    println!("Retriever pronto (top_k = {})", config.retrieval.top_k);

    let agent = Agent::new(
        retriever,
        provider,
        PromptTemplate::default(),
        config.agent.demo_questions.clone(),
    );

    agent.run_batch().await;
    agent
        .run_interactive(BufReader::new(tokio::io::stdin()))
        .await?;

    Ok(())
}

fn init_subscriber() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Priority: `--config <path>` arg > `ORACULO_CONFIG` env > `config/default.toml`.
fn resolve_config_path() -> PathBuf {
    let args: Vec<String> = std::env::args().collect();
    if let Some(path) = args.windows(2).find(|w| w[0] == "--config").map(|w| &w[1]) {
        return PathBuf::from(path);
    }
    if let Ok(path) = std::env::var("ORACULO_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("config/default.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_config_path_defaults() {
        let path = resolve_config_path();
        assert_eq!(path, PathBuf::from("config/default.toml"));
    }

    #[test]
    fn config_loading_from_default_toml() {
        let config = Config::load(std::path::Path::new("config/default.toml")).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.retrieval.top_k, 3);
    }
}
