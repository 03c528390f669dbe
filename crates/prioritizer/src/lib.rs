#![warn(clippy::pedantic)]
// Allow common pedantic lints that don't affect correctness
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::map_unwrap_or)]

//! # Prioritizer
//!
//! AI-assisted prioritization for remote task lists.
//!
//! This crate provides:
//! - A task store abstraction with a Google Tasks REST implementation
//! - Ranking of top-level tasks by an inference model, replayed through
//!   relative moves
//! - Subtask suggestions materialized as child tasks
//! - Validation and repair of model output
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use prioritizer::{GeminiProvider, GoogleTasksStore, PrioritizerConfig, Workflow};
//!
//! let config = PrioritizerConfig::load()?;
//! let store = Arc::new(GoogleTasksStore::new(token)?);
//! let provider = Arc::new(GeminiProvider::new(config.api_key()?));
//!
//! let report = Workflow::new(store, provider, &config)
//!     .run(&config.target_lists)
//!     .await;
//! ```

// Core entities
pub mod entities;

// Error types
pub mod errors;

// Runtime configuration
pub mod config;

// Service account credentials
pub mod auth;

// Task store layer
pub mod store;

// Reordering, subtask creation, and the per-list workflow
pub mod domain;

// Terminal UI helpers
pub mod ui;

// AI integration
pub mod ai;

// Re-export key types for convenience
pub use config::PrioritizerConfig;
pub use domain::{ListOutcome, ReorderEngine, RunReport, SubtaskMaterializer, Workflow};
pub use entities::{NewTask, PriorityRecord, SubtaskSuggestion, Task, TaskList, TaskStatus};
pub use errors::{PrioritizerError, PrioritizerResult};
pub use store::{GoogleTasksStore, TaskStore};

// Re-export AI types
pub use ai::{
    AIMessage, AIProvider, AIResponse, AIRole, GeminiProvider, GenerateOptions, PromptManager,
    PromptTemplate, TokenUsage,
};
