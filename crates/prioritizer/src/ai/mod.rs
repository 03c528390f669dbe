//! AI integration for task prioritization.
//!
//! This module provides:
//! - AI provider abstraction and the Gemini implementation
//! - Prompt templates with Handlebars
//! - Parsing and repair of model output

pub mod prompts;
pub mod provider;
pub mod response;

// Provider implementations
pub mod gemini;

// Re-exports
pub use gemini::GeminiProvider;
pub use prompts::{PromptManager, PromptTemplate};
pub use provider::{AIMessage, AIProvider, AIResponse, AIRole, GenerateOptions, TokenUsage};
pub use response::{clean_response, parse_priorities, parse_records, parse_subtask_suggestions};
