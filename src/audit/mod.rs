//! Capped, structured audit ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Coarse audit event category.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditLevel {
    Info,
    Warning,
    Error,
    Recovery,
    GatePass,
    SkillActivate,
    GitOp,
    Deploy,
}

/// One audit ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEntry {
    pub id: Uuid,
    pub level: AuditLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub metadata: serde_json::Value,
}

/// Capped audit ledger, most-recent-first.
///
/// Appends never fail: metadata supplied as a raw string is best-effort
/// parsed as JSON and falls back to `{"raw": <string>}`.
#[derive(Debug, Clone)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
    capacity: usize,
}

impl AuditLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    /// Append an entry with structured metadata.
    pub fn append(&mut self, level: AuditLevel, message: impl Into<String>) {
        self.append_with(level, message, serde_json::Value::Null);
    }

    /// Append an entry with explicit metadata.
    pub fn append_with(
        &mut self,
        level: AuditLevel,
        message: impl Into<String>,
        metadata: serde_json::Value,
    ) {
        let entry = AuditEntry {
            id: Uuid::new_v4(),
            level,
            message: message.into(),
            timestamp: Utc::now(),
            metadata,
        };
        self.entries.insert(0, entry);
        // Oldest entries live at the tail.
        self.entries.truncate(self.capacity);
    }

    /// Append an entry whose metadata arrives as a raw context string.
    pub fn append_raw(&mut self, level: AuditLevel, message: impl Into<String>, context: &str) {
        let metadata = parse_metadata(context);
        self.append_with(level, message, metadata);
    }

    /// Entries, most recent first.
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Best-effort parse of a raw context string into structured metadata.
fn parse_metadata(context: &str) -> serde_json::Value {
    match serde_json::from_str::<serde_json::Value>(context) {
        Ok(value) if value.is_object() || value.is_array() => value,
        _ => serde_json::json!({ "raw": context }),
    }
}
