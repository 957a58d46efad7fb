//! Session aggregate state.

use crate::audit::AuditLog;
use crate::matching::RankedMatch;
use crate::resilience::ResilienceStats;
use crate::skills::SkillRegistry;
use crate::types::ChatMessage;

/// Aggregate root for one session.
///
/// Owned by the session actor; callers only ever see clones taken after a
/// turn has fully committed.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub session_id: String,
    pub model: String,
    pub is_processing: bool,
    pub messages: Vec<ChatMessage>,
    /// Skill ids matched for the current turn.
    pub active_skills: Vec<String>,
    /// Full ranking from the current turn, best first.
    pub suggested_skills: Vec<RankedMatch>,
    pub skills: SkillRegistry,
    pub resilience: ResilienceStats,
    pub audit: AuditLog,
    history_capacity: usize,
}

impl SessionState {
    pub fn new(
        session_id: impl Into<String>,
        model: impl Into<String>,
        skills: SkillRegistry,
        audit_capacity: usize,
        history_capacity: usize,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            model: model.into(),
            is_processing: false,
            messages: Vec::new(),
            active_skills: Vec::new(),
            suggested_skills: Vec::new(),
            skills,
            resilience: ResilienceStats::default(),
            audit: AuditLog::new(audit_capacity),
            history_capacity,
        }
    }

    /// Append a conversation message, evicting the oldest beyond capacity.
    pub fn push_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
        if self.messages.len() > self.history_capacity {
            let excess = self.messages.len() - self.history_capacity;
            self.messages.drain(0..excess);
        }
    }

    /// Reset conversation history and skill selections.
    ///
    /// Resilience stats and the audit log deliberately survive a clear.
    pub fn clear_conversation(&mut self) {
        self.messages.clear();
        self.active_skills.clear();
        self.suggested_skills.clear();
    }
}
