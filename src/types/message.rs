//! Conversation message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A message in a session conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Comma-joined skill ids that routed this reply, when any matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_insight: Option<String>,
    /// System log lines are shown to the user but never sent to the provider.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_system_log: bool,
}

impl ChatMessage {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            tool_calls: Vec::new(),
            skill_insight: None,
            is_system_log: false,
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a system log line (kept out of provider history).
    pub fn system_log(content: impl Into<String>) -> Self {
        Self {
            is_system_log: true,
            ..Self::new(Role::System, content)
        }
    }

    /// Attach tool calls reported by the provider.
    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = tool_calls;
        self
    }

    /// Attach a skill-routing insight.
    pub fn with_skill_insight(mut self, insight: impl Into<String>) -> Self {
        self.skill_insight = Some(insight.into());
        self
    }
}

/// Conversation role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A tool call returned by the completion provider.
///
/// Tool execution happens on the provider side; the engine only records the
/// calls on the assistant message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}
