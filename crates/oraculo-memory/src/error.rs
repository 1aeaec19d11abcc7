#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("request failed with status {0}")]
    Status(u16),

    #[error("response too large: {got} bytes (max {max})")]
    BodyTooLarge { got: usize, max: usize },

    #[error("response is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("invalid selector: {0}")]
    Selector(String),

    #[error("no content matched the configured selectors")]
    NoContent,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("vector store is empty")]
    Empty,

    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    #[error("embedding failed: {0}")]
    Embedding(#[from] oraculo_llm::LlmError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
