//! Ordered skill catalog.

use tracing::debug;

use crate::error::{NexusError, Result};

use super::skill::{Skill, SkillHooks, SkillSpec, SkillStatus};

/// Ordered catalog of registered skills.
///
/// Registration order is significant: the matcher breaks rank ties by it.
#[derive(Debug, Clone, Default)]
pub struct SkillRegistry {
    skills: Vec<Skill>,
}

impl SkillRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The control plane's stock catalog.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for spec in default_catalog() {
            // Stock patterns are known-good; a failure here is a programming error.
            registry
                .register(spec)
                .unwrap_or_else(|e| panic!("stock skill catalog invalid: {e}"));
        }
        registry
    }

    /// Register a skill, compiling its trigger pattern.
    ///
    /// # Errors
    ///
    /// Returns [`NexusError::Pattern`] for an invalid pattern and
    /// [`NexusError::DuplicateSkill`] for a reused id.
    pub fn register(&mut self, spec: SkillSpec) -> Result<()> {
        if self.get(&spec.id).is_some() {
            return Err(NexusError::DuplicateSkill(spec.id));
        }
        let skill = Skill::compile(spec)?;
        debug!(skill = %skill.id, "skill registered");
        self.skills.push(skill);
        Ok(())
    }

    /// Look up a skill by id.
    pub fn get(&self, id: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.id == id)
    }

    /// Administrative toggle: Disabled becomes Standby, anything else Disabled.
    pub fn toggle(&mut self, id: &str) -> Result<SkillStatus> {
        let skill = self
            .skills
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| NexusError::SkillNotFound(id.to_string()))?;
        skill.status = match skill.status {
            SkillStatus::Disabled => SkillStatus::Standby,
            _ => SkillStatus::Disabled,
        };
        debug!(skill = %skill.id, status = %skill.status, "skill toggled");
        Ok(skill.status)
    }

    /// Record a successful activation for each listed skill id.
    ///
    /// Unknown ids are ignored; they can appear when a skill was removed
    /// between matching and completion.
    pub fn record_successes(&mut self, ids: &[String]) {
        for skill in &mut self.skills {
            if ids.iter().any(|id| id == &skill.id) {
                skill.record_success();
            }
        }
    }

    /// Iterate skills in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Skill> {
        self.skills.iter()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

/// Stock skills shipped with the control plane.
fn default_catalog() -> Vec<SkillSpec> {
    vec![
        SkillSpec {
            id: "python-dev".into(),
            name: "python-dev".into(),
            description: "Lints, tests, and builds Python modules.".into(),
            icon: "Cpu".into(),
            trigger_regex: r".*\.py$".into(),
            intent_rules: vec!["run pytest".into(), "lint python".into()],
            weight: Some(0.85),
            confidence: 85.0,
            status: SkillStatus::Active,
            success_count: 120,
            total_activations: 140,
            hooks: SkillHooks::default(),
        },
        SkillSpec {
            id: "security-audit".into(),
            name: "security-audit".into(),
            description: "Automated vulnerability scanning for source code.".into(),
            icon: "Shield".into(),
            trigger_regex: "auth|password|secret|key".into(),
            intent_rules: vec!["security scan".into(), "audit code".into()],
            weight: Some(0.92),
            confidence: 92.0,
            status: SkillStatus::Standby,
            success_count: 45,
            total_activations: 48,
            hooks: SkillHooks::default(),
        },
        SkillSpec {
            id: "web-deploy".into(),
            name: "web-deploy".into(),
            description: "Cloudflare Workers and Pages synchronization.".into(),
            icon: "Globe".into(),
            trigger_regex: "deploy|publish|worker".into(),
            intent_rules: vec!["ship it".into(), "go live".into()],
            weight: Some(0.98),
            confidence: 78.0,
            status: SkillStatus::Active,
            success_count: 89,
            total_activations: 112,
            hooks: SkillHooks::default(),
        },
    ]
}
