//! Staged workflow simulation.
//!
//! Workflow actions progress through timed stages, each landing in the
//! session's audit ledger. Stage tasks are bound to the session lifetime via
//! a cancellation token, so a removed session cannot leak scheduled work.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::audit::AuditLevel;

/// A long-running infrastructure action simulated in stages.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum WorkflowAction {
    Deploy,
    Rollback,
    Snapshot,
}

/// One timed step of a workflow progression.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowStage {
    /// Delay before this stage fires, relative to the previous stage.
    pub delay: Duration,
    pub level: AuditLevel,
    pub message: &'static str,
}

const STAGE_GAP: Duration = Duration::from_millis(800);

/// Stage table for an action. The first stage fires immediately.
pub fn stages(action: WorkflowAction) -> Vec<WorkflowStage> {
    match action {
        WorkflowAction::Deploy => vec![
            WorkflowStage {
                delay: Duration::ZERO,
                level: AuditLevel::Info,
                message: "Deploy pipeline started: building artifacts",
            },
            WorkflowStage {
                delay: STAGE_GAP,
                level: AuditLevel::Info,
                message: "Artifacts staged to edge network",
            },
            WorkflowStage {
                delay: STAGE_GAP,
                level: AuditLevel::Deploy,
                message: "Release promoted to production",
            },
        ],
        WorkflowAction::Rollback => vec![
            WorkflowStage {
                delay: Duration::ZERO,
                level: AuditLevel::Info,
                message: "Rollback initiated: locating last healthy snapshot",
            },
            WorkflowStage {
                delay: STAGE_GAP,
                level: AuditLevel::Recovery,
                message: "Snapshot restored; services re-pinned",
            },
        ],
        WorkflowAction::Snapshot => vec![
            WorkflowStage {
                delay: Duration::ZERO,
                level: AuditLevel::Info,
                message: "Snapshot capture started",
            },
            WorkflowStage {
                delay: STAGE_GAP,
                level: AuditLevel::Info,
                message: "Snapshot verified and replicated",
            },
        ],
    }
}
