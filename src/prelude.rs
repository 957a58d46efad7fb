//! Curated re-exports for common usage.

pub use crate::audit::{AuditEntry, AuditLevel, AuditLog};
pub use crate::completion::{
    CompletionProvider, CompletionRequest, CompletionResponse, OpenAiCompatibleProvider,
};
pub use crate::config::{EngineSettings, NexusConfig};
pub use crate::error::{NexusError, Result};
pub use crate::matching::{rank, RankedMatch};
pub use crate::resilience::{
    BreakerState, CircuitBreaker, FailureSource, RandomFailureSource, ResilienceStats,
    ScriptedFailureSource,
};
pub use crate::session::{SessionHandle, SessionManager, SessionState, TurnOutcome};
pub use crate::skills::{Skill, SkillRegistry, SkillSpec, SkillStatus};
pub use crate::types::{ChatMessage, Role, ToolCall};
pub use crate::workflow::WorkflowAction;
