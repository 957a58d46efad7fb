//! Completion provider trait and prompt assembly.

pub mod http;
pub mod openai;

pub use openai::OpenAiCompatibleProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::NexusError;
use crate::skills::SkillRegistry;
use crate::types::{ChatMessage, Role, ToolCall};

/// A single prompt message sent to the provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Tool definition forwarded to the provider API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A request sent to a completion provider.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<PromptMessage>,
    pub tools: Vec<ToolDefinition>,
}

/// Response from a completion provider.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

/// External completion collaborator.
///
/// The engine catches provider failures at the orchestration boundary and
/// surfaces them as a generic processing error without corrupting session
/// state.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name for logging.
    fn provider_name(&self) -> &str;

    /// Produce a completion for the assembled prompt.
    async fn complete(&self, request: &CompletionRequest)
        -> Result<CompletionResponse, NexusError>;
}

/// Assemble the prompt for one turn: system prompt with skill routing
/// context, a window of recent history (system log lines excluded), then the
/// user message.
pub fn build_prompt(
    user_message: &str,
    history: &[ChatMessage],
    active_skills: &[String],
    registry: &SkillRegistry,
    window: usize,
) -> Vec<PromptMessage> {
    let mut messages = vec![PromptMessage::system(build_system_prompt(
        active_skills,
        registry,
    ))];

    let recent: Vec<&ChatMessage> = history
        .iter()
        .filter(|m| !m.is_system_log)
        .collect();
    let start = recent.len().saturating_sub(window);
    for message in &recent[start..] {
        messages.push(PromptMessage {
            role: message.role,
            content: message.content.clone(),
        });
    }

    messages.push(PromptMessage::user(user_message));
    messages
}

/// System prompt, compressed to the matched skill modules.
fn build_system_prompt(active_skills: &[String], registry: &SkillRegistry) -> String {
    let mut prompt = String::from(
        "You are the Nexus Control Plane Agent. You manage a Termux-based autonomous development infrastructure.\n",
    );
    if active_skills.is_empty() {
        return prompt;
    }
    prompt.push_str("\n[CONTEXT COMPRESSION ACTIVE] Loading only specific skill modules:\n");
    for skill_id in active_skills {
        let Some(skill) = registry.get(skill_id) else {
            continue;
        };
        prompt.push_str(&format!(
            "- {}: {} (Confidence: {}%)\n",
            skill.name, skill.description, skill.confidence
        ));
        // Specialized rule blocks for the stock skills.
        if skill_id == "python-dev" {
            prompt.push_str("  Rules: Use PEP8, prioritize fast-fail tests.\n");
        }
        if skill_id == "security-audit" {
            prompt.push_str("  Rules: Scan for RSA/PEM blocks, reject plaintext secrets.\n");
        }
    }
    prompt.push_str("\nEfficiency: Loading matching skills saved ~40% context window tokens.");
    prompt
}
