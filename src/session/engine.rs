//! The per-turn pipeline: breaker check, intent ranking, delegation,
//! state commit.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::audit::AuditLevel;
use crate::completion::{build_prompt, CompletionProvider, CompletionRequest, ToolDefinition};
use crate::config::EngineSettings;
use crate::error::{NexusError, Result};
use crate::matching;
use crate::resilience::{BreakerState, CircuitBreaker, FailureSource};
use crate::skills::SkillRegistry;
use crate::types::ChatMessage;

use super::state::SessionState;

/// Fixed reply returned while the gate is locked.
pub const GATE_LOCKED_REPLY: &str = "System Gate is currently LOCKED due to persistent integrity failures. Please check 'Overview' for remediation steps.";

/// Result of one processed turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub reply: ChatMessage,
    /// True when the breaker refused the turn. A refusal is a defined
    /// response, not an error.
    pub refused: bool,
    pub state: SessionState,
}

/// Orchestrates one session's turns.
///
/// Owned by the session actor, which serializes all access; nothing here is
/// shared across sessions.
pub struct SessionEngine {
    state: SessionState,
    breaker: CircuitBreaker,
    failure_source: Box<dyn FailureSource>,
    provider: Arc<dyn CompletionProvider>,
    settings: EngineSettings,
    tools: Vec<ToolDefinition>,
}

impl SessionEngine {
    pub fn new(
        session_id: impl Into<String>,
        model: impl Into<String>,
        skills: SkillRegistry,
        provider: Arc<dyn CompletionProvider>,
        failure_source: Box<dyn FailureSource>,
        settings: EngineSettings,
    ) -> Self {
        let state = SessionState::new(
            session_id,
            model,
            skills,
            settings.audit_capacity,
            settings.history_capacity,
        );
        let breaker = CircuitBreaker::new(settings.breaker_threshold);
        Self {
            state,
            breaker,
            failure_source,
            provider,
            settings,
            tools: Vec::new(),
        }
    }

    /// Tool definitions forwarded to the provider on every turn.
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.state.clone()
    }

    /// Mutable access for administrative operations (actor-internal).
    pub(crate) fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    /// Process one inbound message end to end.
    ///
    /// # Errors
    ///
    /// [`NexusError::InvalidArgument`] for an empty message, and a generic
    /// [`NexusError::Provider`] when the completion collaborator fails. In
    /// the latter case the user's message stays recorded and no assistant
    /// reply is appended.
    pub async fn handle_message(&mut self, text: &str) -> Result<TurnOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Err(NexusError::InvalidArgument("message must not be empty".into()));
        }

        self.state.is_processing = true;

        // 1. Advance the breaker with this turn's failure signal.
        let failure = self.failure_source.sample();
        let transition = self.breaker.observe(failure);
        self.state.resilience = self.breaker.stats().clone();
        if transition.opened() {
            self.state.audit.append_with(
                AuditLevel::Error,
                "Circuit breaker opened after repeated gate failures",
                serde_json::json!({ "consecutive_failures": self.state.resilience.consecutive_failures }),
            );
        } else if transition.recovered() {
            self.state
                .audit
                .append(AuditLevel::Recovery, "Circuit breaker closed; gate restored");
        }

        // 2. Refuse the whole turn while the gate is locked. Conversation
        //    history and skill statistics stay untouched.
        if self.breaker.state() == BreakerState::Open {
            warn!(session = %self.state.session_id, "turn refused: gate locked");
            self.state.audit.append(
                AuditLevel::Warning,
                "Gate locked; message processing refused",
            );
            self.state.is_processing = false;
            return Ok(TurnOutcome {
                reply: ChatMessage::assistant(GATE_LOCKED_REPLY),
                refused: true,
                state: self.state.clone(),
            });
        }

        // 3. Rank intents and record the turn's skill selection.
        let ranked = matching::rank(text, &self.state.skills);
        let active: Vec<String> = ranked.iter().map(|m| m.skill_id.clone()).collect();
        if !active.is_empty() {
            debug!(session = %self.state.session_id, skills = ?active, "skills activated");
            self.state.audit.append_with(
                AuditLevel::SkillActivate,
                format!("Activated skills: {}", active.join(", ")),
                serde_json::json!({ "skills": active }),
            );
        }
        self.state.active_skills = active.clone();
        self.state.suggested_skills = ranked;

        // 4. Commit the user's message (and the retry log line when the gate
        //    flickered) before delegating.
        let prompt = build_prompt(
            text,
            &self.state.messages,
            &active,
            &self.state.skills,
            self.settings.history_window,
        );
        self.state.push_message(ChatMessage::user(text));
        if failure {
            self.state.push_message(ChatMessage::system_log(format!(
                "[RESILIENCE] Gate Failure Detected. Initiating Retry {}/{}...",
                self.state.resilience.retry_count, self.settings.breaker_threshold
            )));
        }

        // 5. Delegate to the completion collaborator.
        let request = CompletionRequest {
            model: self.state.model.clone(),
            messages: prompt,
            tools: self.tools.clone(),
        };
        let response = match self.provider.complete(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(session = %self.state.session_id, error = %e, "completion failed");
                self.state.is_processing = false;
                return Err(NexusError::Provider("Processing error".into()));
            }
        };

        // 6. Commit the reply and the adaptive statistics.
        self.state.skills.record_successes(&active);
        let mut reply = ChatMessage::assistant(response.content).with_tool_calls(response.tool_calls);
        if !active.is_empty() {
            reply = reply.with_skill_insight(active.join(", "));
        }
        self.state.push_message(reply.clone());
        self.state.audit.append_with(
            AuditLevel::GatePass,
            "Turn completed; gate pass recorded",
            serde_json::json!({ "skills": active }),
        );
        info!(session = %self.state.session_id, "turn completed");
        self.state.is_processing = false;

        Ok(TurnOutcome {
            reply,
            refused: false,
            state: self.state.clone(),
        })
    }

    /// Reset the conversation; resilience stats and audit log survive.
    pub fn clear(&mut self) -> SessionState {
        self.state.clear_conversation();
        self.state.clone()
    }
}
