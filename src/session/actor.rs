//! Per-session actor.
//!
//! One task owns each [`SessionEngine`] behind an mpsc mailbox. Commands run
//! to completion in arrival order, which is what serializes turns for a
//! session; cross-session state is fully independent.

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::audit::AuditLevel;
use crate::error::{NexusError, Result};
use crate::skills::SkillStatus;
use crate::workflow::{self, WorkflowAction};

use super::engine::{SessionEngine, TurnOutcome};
use super::state::SessionState;

const MAILBOX_CAPACITY: usize = 32;

enum Command {
    HandleMessage {
        text: String,
        reply: oneshot::Sender<Result<TurnOutcome>>,
    },
    State {
        reply: oneshot::Sender<SessionState>,
    },
    Clear {
        reply: oneshot::Sender<SessionState>,
    },
    ToggleSkill {
        id: String,
        reply: oneshot::Sender<Result<SkillStatus>>,
    },
    SetModel {
        model: String,
        reply: oneshot::Sender<SessionState>,
    },
    TriggerWorkflow {
        action: WorkflowAction,
        reply: oneshot::Sender<()>,
    },
    // Internal: a scheduled workflow stage fired.
    WorkflowStage {
        action: WorkflowAction,
        level: AuditLevel,
        message: &'static str,
    },
}

/// Cloneable handle to a session actor.
#[derive(Clone)]
pub struct SessionHandle {
    session_id: String,
    tx: mpsc::Sender<Command>,
    cancel: CancellationToken,
}

impl SessionHandle {
    /// Spawn the actor task for an engine and return its handle.
    pub fn spawn(engine: SessionEngine) -> Self {
        let session_id = engine.state().session_id.clone();
        let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
        let cancel = CancellationToken::new();
        tokio::spawn(run(engine, tx.clone(), rx, cancel.clone()));
        Self {
            session_id,
            tx,
            cancel,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Process one inbound message; turns for this session are serialized.
    pub async fn handle_message(&self, text: impl Into<String>) -> Result<TurnOutcome> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::HandleMessage {
            text: text.into(),
            reply,
        })
        .await?;
        self.recv(rx).await?
    }

    /// Read-only snapshot of the session state.
    pub async fn state(&self) -> Result<SessionState> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::State { reply }).await?;
        self.recv(rx).await
    }

    /// Reset conversation history and skill selections.
    pub async fn clear(&self) -> Result<SessionState> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Clear { reply }).await?;
        self.recv(rx).await
    }

    /// Administratively toggle a skill between Disabled and Standby.
    pub async fn toggle_skill(&self, id: impl Into<String>) -> Result<SkillStatus> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::ToggleSkill {
            id: id.into(),
            reply,
        })
        .await?;
        self.recv(rx).await?
    }

    /// Replace the session's model id.
    pub async fn set_model(&self, model: impl Into<String>) -> Result<SessionState> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::SetModel {
            model: model.into(),
            reply,
        })
        .await?;
        self.recv(rx).await
    }

    /// Start a staged workflow progression for this session.
    pub async fn trigger_workflow(&self, action: WorkflowAction) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::TriggerWorkflow { action, reply }).await?;
        self.recv(rx).await
    }

    /// Tear the session down, cancelling pending workflow stages.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.tx
            .send(command)
            .await
            .map_err(|_| NexusError::SessionClosed(self.session_id.clone()))
    }

    async fn recv<T>(&self, rx: oneshot::Receiver<T>) -> Result<T> {
        rx.await
            .map_err(|_| NexusError::SessionClosed(self.session_id.clone()))
    }
}

async fn run(
    mut engine: SessionEngine,
    tx: mpsc::Sender<Command>,
    mut rx: mpsc::Receiver<Command>,
    cancel: CancellationToken,
) {
    loop {
        let command = tokio::select! {
            _ = cancel.cancelled() => break,
            command = rx.recv() => match command {
                Some(command) => command,
                None => break,
            },
        };

        match command {
            Command::HandleMessage { text, reply } => {
                let outcome = engine.handle_message(&text).await;
                let _ = reply.send(outcome);
            }
            Command::State { reply } => {
                let _ = reply.send(engine.state());
            }
            Command::Clear { reply } => {
                let _ = reply.send(engine.clear());
            }
            Command::ToggleSkill { id, reply } => {
                let _ = reply.send(engine.state_mut().skills.toggle(&id));
            }
            Command::SetModel { model, reply } => {
                engine.state_mut().model = model;
                let _ = reply.send(engine.state());
            }
            Command::TriggerWorkflow { action, reply } => {
                spawn_workflow(action, tx.clone(), cancel.child_token());
                let _ = reply.send(());
            }
            Command::WorkflowStage {
                action,
                level,
                message,
            } => {
                engine.state_mut().audit.append_with(
                    level,
                    message,
                    serde_json::json!({ "workflow": action.to_string() }),
                );
            }
        }
    }
    debug!(session = %engine.state().session_id, "session actor stopped");
}

/// Run an action's stages on their schedule, feeding results back through
/// the mailbox. The child token ties the task to the session lifetime.
fn spawn_workflow(action: WorkflowAction, tx: mpsc::Sender<Command>, cancel: CancellationToken) {
    tokio::spawn(async move {
        for stage in workflow::stages(action) {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(stage.delay) => {}
            }
            let fired = tx
                .send(Command::WorkflowStage {
                    action,
                    level: stage.level,
                    message: stage.message,
                })
                .await;
            if fired.is_err() {
                return;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::completion::{CompletionProvider, CompletionRequest, CompletionResponse};
    use crate::config::EngineSettings;
    use crate::resilience::ScriptedFailureSource;
    use crate::skills::SkillRegistry;

    use super::*;

    struct EchoProvider;

    #[async_trait]
    impl CompletionProvider for EchoProvider {
        fn provider_name(&self) -> &str {
            "echo"
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse> {
            let last = request
                .messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();
            Ok(CompletionResponse {
                content: format!("echo: {last}"),
                tool_calls: vec![],
            })
        }
    }

    fn handle() -> SessionHandle {
        let engine = SessionEngine::new(
            "actor-test",
            "test-model",
            SkillRegistry::with_defaults(),
            Arc::new(EchoProvider),
            Box::new(ScriptedFailureSource::default()),
            EngineSettings::default(),
        );
        SessionHandle::spawn(engine)
    }

    #[tokio::test]
    async fn handle_message_round_trips() {
        let handle = handle();
        let outcome = handle.handle_message("hello").await.unwrap();
        assert_eq!(outcome.reply.content, "echo: hello");
    }

    #[tokio::test]
    async fn state_snapshot_reflects_turns() {
        let handle = handle();
        handle.handle_message("one").await.unwrap();
        handle.handle_message("two").await.unwrap();
        let state = handle.state().await.unwrap();
        assert_eq!(state.messages.len(), 4);
    }

    #[tokio::test]
    async fn closed_session_rejects_commands() {
        let handle = handle();
        handle.close();
        // Give the actor task a chance to observe the cancellation.
        tokio::task::yield_now().await;
        let err = handle.handle_message("late").await.unwrap_err();
        assert!(matches!(err, NexusError::SessionClosed(_)));
    }

    #[tokio::test]
    async fn toggle_skill_through_actor() {
        let handle = handle();
        let status = handle.toggle_skill("python-dev").await.unwrap();
        assert_eq!(status, SkillStatus::Disabled);
    }

    #[tokio::test]
    async fn set_model_replaces_model() {
        let handle = handle();
        let state = handle.set_model("another-model").await.unwrap();
        assert_eq!(state.model, "another-model");
    }

    #[tokio::test(start_paused = true)]
    async fn workflow_stages_land_in_audit_log() {
        let handle = handle();
        handle
            .trigger_workflow(WorkflowAction::Deploy)
            .await
            .unwrap();

        // Past the last stage delay.
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;

        let state = handle.state().await.unwrap();
        let levels: Vec<AuditLevel> = state.audit.entries().iter().map(|e| e.level).collect();
        assert!(levels.contains(&AuditLevel::Deploy));
        assert_eq!(
            state
                .audit
                .entries()
                .iter()
                .filter(|e| e.metadata["workflow"] == "deploy")
                .count(),
            3
        );
    }

    #[tokio::test(start_paused = true)]
    async fn closing_session_cancels_pending_stages() {
        let handle = handle();
        handle
            .trigger_workflow(WorkflowAction::Deploy)
            .await
            .unwrap();

        // Let only the immediate stage fire, then tear the session down.
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        let state = handle.state().await.unwrap();
        assert_eq!(state.audit.len(), 1);
        handle.close();

        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        assert!(handle.state().await.is_err());
    }
}
