//! Configuration, prompt assembly, and the question-answering loop.

pub mod agent;
pub mod config;
pub mod prompt;

pub use agent::{Agent, AgentError};
pub use config::Config;
pub use prompt::PromptTemplate;
