//! Prompt template system for AI operations.
//!
//! This module provides:
//! - Handlebars-based prompt templates
//! - The ranking and subtask-suggestion templates

use handlebars::Handlebars;
use serde::Serialize;
use std::collections::HashMap;

use crate::errors::{PrioritizerError, PrioritizerResult};

// Template modules
mod rank_tasks;
mod suggest_subtasks;

pub use rank_tasks::{RankCandidate, RankTasksContext, RANK_TASKS};
pub use suggest_subtasks::{SuggestSubtasksContext, SuggestionCandidate, SUGGEST_SUBTASKS};

/// A prompt template with system and user messages.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// Template ID
    pub id: String,
    /// Template version
    pub version: String,
    /// Description
    pub description: String,
    /// System prompt template
    pub system: String,
    /// User prompt template
    pub user: String,
}

impl PromptTemplate {
    /// Create a new prompt template.
    pub fn new(id: impl Into<String>, system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: "1.0.0".to_string(),
            description: String::new(),
            system: system.into(),
            user: user.into(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Render the template with the given context.
    pub fn render<T: Serialize>(&self, context: &T) -> PrioritizerResult<(String, String)> {
        let mut handlebars = create_handlebars();

        handlebars
            .register_template_string("system", &self.system)
            .map_err(|e| PrioritizerError::Ai(format!("Invalid system template: {e}")))?;

        handlebars
            .register_template_string("user", &self.user)
            .map_err(|e| PrioritizerError::Ai(format!("Invalid user template: {e}")))?;

        let system = handlebars
            .render("system", context)
            .map_err(|e| PrioritizerError::Ai(format!("Failed to render system prompt: {e}")))?;

        let user = handlebars
            .render("user", context)
            .map_err(|e| PrioritizerError::Ai(format!("Failed to render user prompt: {e}")))?;

        Ok((system, user))
    }
}

/// Create a Handlebars instance with custom helpers.
fn create_handlebars() -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();

    // Disable HTML escaping for prompts
    handlebars.register_escape_fn(handlebars::no_escape);

    // Helper: {{{json value}}}
    handlebars.register_helper(
        "json",
        Box::new(
            |h: &handlebars::Helper,
             _: &Handlebars,
             _: &handlebars::Context,
             _: &mut handlebars::RenderContext,
             out: &mut dyn handlebars::Output| {
                if let Some(param) = h.param(0) {
                    let json = serde_json::to_string_pretty(param.value())
                        .unwrap_or_else(|_| "null".to_string());
                    out.write(&json)?;
                }
                Ok(())
            },
        ),
    );

    handlebars
}

/// Prompt manager for loading and rendering templates.
pub struct PromptManager {
    templates: HashMap<String, PromptTemplate>,
}

impl PromptManager {
    /// Create a new prompt manager with default templates.
    pub fn new() -> Self {
        let mut manager = Self {
            templates: HashMap::new(),
        };

        manager.register(rank_tasks::template());
        manager.register(suggest_subtasks::template());

        manager
    }

    /// Register a template, replacing any with the same ID.
    pub fn register(&mut self, template: PromptTemplate) {
        self.templates.insert(template.id.clone(), template);
    }

    /// Get a template by ID.
    pub fn get(&self, id: &str) -> Option<&PromptTemplate> {
        self.templates.get(id)
    }

    /// Render a template with context.
    pub fn render<T: Serialize>(&self, id: &str, context: &T) -> PrioritizerResult<(String, String)> {
        let template = self
            .get(id)
            .ok_or_else(|| PrioritizerError::Ai(format!("Template '{}' not found", id)))?;
        template.render(context)
    }
}

impl Default for PromptManager {
    fn default() -> Self {
        Self::new()
    }
}
