//! reminisce-providers — question-generation integrations.
//!
//! Implements the `QuestionGenerator` trait for Azure OpenAI and
//! OpenAI-compatible endpoints, plus a scriptable mock, letting the quiz
//! assembler draft questions from an LLM when one is configured.

pub mod azure;
pub mod config;
pub mod mock;
pub mod openai;

pub use azure::AzureOpenAiGenerator;
pub use config::{create_generator, load_config, load_config_from, GeneratorConfig, ReminisceConfig};
pub use mock::MockGenerator;
pub use openai::OpenAiGenerator;
