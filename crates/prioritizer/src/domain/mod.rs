//! Domain logic for prioritizing task lists.
//!
//! - [`ReorderEngine`] ranks a list's top-level tasks and replays the order
//!   through relative moves
//! - [`SubtaskMaterializer`] asks for subtask suggestions and creates them
//! - [`Workflow`] drives both over each configured list

mod reorder;
mod subtasks;
mod workflow;

pub use reorder::{plan_moves, sort_by_position, MoveOp, ReorderEngine};
pub use subtasks::{subtask_notes, SubtaskMaterializer};
pub use workflow::{ListOutcome, ListReport, RunReport, Workflow};

use serde::Serialize;

use crate::ai::{AIMessage, AIProvider, GenerateOptions, PromptManager};
use crate::config::PrioritizerConfig;
use crate::errors::PrioritizerResult;

/// Model parameters shared by both inference calls.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl ModelSettings {
    fn options(&self) -> GenerateOptions {
        GenerateOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_output_tokens),
            json_mode: true,
        }
    }
}

impl From<&PrioritizerConfig> for ModelSettings {
    fn from(config: &PrioritizerConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

/// Render a template and return the model's raw text.
async fn generate<T: Serialize>(
    provider: &dyn AIProvider,
    prompts: &PromptManager,
    settings: &ModelSettings,
    template: &str,
    context: &T,
) -> PrioritizerResult<String> {
    let (system, user) = prompts.render(template, context)?;
    let messages = vec![AIMessage::system(system), AIMessage::user(user)];

    let response = provider
        .generate_text(&settings.model, &messages, &settings.options())
        .await?;

    tracing::debug!(
        template = %template,
        provider = %response.provider,
        model = %response.model,
        input_tokens = response.usage.input_tokens,
        output_tokens = response.usage.output_tokens,
        "Model responded"
    );

    Ok(response.text)
}
