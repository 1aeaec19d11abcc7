//! LLM provider abstraction and the Mistral HTTP backend.

pub mod error;
pub mod http;
pub mod mistral;
#[cfg(feature = "mock")]
pub mod mock;
pub mod provider;

pub use error::LlmError;
pub use provider::LlmProvider;
