use std::fmt;
use std::path::Path;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

/// API credential, kept out of `Debug` output. Never read from the config
/// file, only from the environment.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    #[must_use]
    pub fn new(value: String) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub document: DocumentConfig,
    #[serde(default)]
    pub splitter: SplitterSettings,
    #[serde(default)]
    pub retrieval: RetrievalSettings,
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(skip)]
    pub api_key: Option<ApiKey>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            embedding_model: default_embedding_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.mistral.ai/v1".into()
}

fn default_model() -> String {
    "mistral-small-latest".into()
}

fn default_embedding_model() -> String {
    "mistral-embed".into()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f32 {
    0.7
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentConfig {
    #[serde(default = "default_document_url")]
    pub url: String,
    /// CSS selectors of the content regions to keep, in allow-list fashion.
    #[serde(default = "default_selectors")]
    pub selectors: Vec<String>,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            url: default_document_url(),
            selectors: default_selectors(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_document_url() -> String {
    "https://lilianweng.github.io/posts/2023-06-23-agent/".into()
}

fn default_selectors() -> Vec<String> {
    vec![
        ".post-title".into(),
        ".post-header".into(),
        ".post-content".into(),
    ]
}

fn default_max_body_bytes() -> usize {
    oraculo_memory::document::DEFAULT_MAX_BODY_BYTES
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SplitterSettings {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    #[serde(default = "default_sentence_aware")]
    pub sentence_aware: bool,
}

impl Default for SplitterSettings {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            sentence_aware: default_sentence_aware(),
        }
    }
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_sentence_aware() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalSettings {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    3
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentSettings {
    /// Questions answered once at startup before the interactive loop.
    #[serde(default = "default_demo_questions")]
    pub demo_questions: Vec<String>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            demo_questions: default_demo_questions(),
        }
    }
}

fn default_demo_questions() -> Vec<String> {
    vec![
        "Qual é o método padrão para decomposição de tarefas?".into(),
        "Quais são as extensões comuns do método Chain of Thought?".into(),
        "O que é Tree of Thoughts e como funciona?".into(),
    ]
}

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Read the API credential from `ORACULO_API_KEY`, falling back to
    /// `MISTRAL_API_KEY`.
    #[must_use]
    pub fn api_key_from_env() -> Option<ApiKey> {
        std::env::var("ORACULO_API_KEY")
            .or_else(|_| std::env::var("MISTRAL_API_KEY"))
            .ok()
            .filter(|v| !v.is_empty())
            .map(ApiKey::new)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("ORACULO_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("ORACULO_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("ORACULO_LLM_EMBEDDING_MODEL") {
            self.llm.embedding_model = v;
        }
        if let Ok(v) = std::env::var("ORACULO_LLM_TEMPERATURE")
            && let Ok(t) = v.parse::<f32>()
        {
            self.llm.temperature = t;
        }
        if let Ok(v) = std::env::var("ORACULO_DOCUMENT_URL") {
            self.document.url = v;
        }
        if let Ok(v) = std::env::var("ORACULO_SPLITTER_CHUNK_SIZE")
            && let Ok(size) = v.parse::<usize>()
        {
            self.splitter.chunk_size = size;
        }
        if let Ok(v) = std::env::var("ORACULO_SPLITTER_CHUNK_OVERLAP")
            && let Ok(overlap) = v.parse::<usize>()
        {
            self.splitter.chunk_overlap = overlap;
        }
        if let Ok(v) = std::env::var("ORACULO_RETRIEVAL_TOP_K")
            && let Ok(k) = v.parse::<usize>()
        {
            self.retrieval.top_k = k;
        }
    }

    /// # Errors
    ///
    /// Returns an error when a setting is out of range or inconsistent.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.document.url.trim().is_empty() {
            bail!("document.url must not be empty");
        }
        if self.document.selectors.is_empty() {
            bail!("document.selectors must list at least one selector");
        }
        if self.splitter.chunk_size == 0 {
            bail!("splitter.chunk_size must be greater than zero");
        }
        if self.splitter.chunk_overlap >= self.splitter.chunk_size {
            bail!(
                "splitter.chunk_overlap ({}) must be smaller than splitter.chunk_size ({})",
                self.splitter.chunk_overlap,
                self.splitter.chunk_size
            );
        }
        if self.retrieval.top_k == 0 {
            bail!("retrieval.top_k must be greater than zero");
        }
        if self.llm.max_tokens == 0 {
            bail!("llm.max_tokens must be greater than zero");
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            bail!(
                "llm.temperature ({}) must be within [0.0, 2.0]",
                self.llm.temperature
            );
        }
        Ok(())
    }
}
