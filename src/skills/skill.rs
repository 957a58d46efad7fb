//! Skill definition types.

use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{NexusError, Result};

/// Administrative status of a skill.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString,
)]
pub enum SkillStatus {
    Active,
    Standby,
    Disabled,
}

/// Optional pre/post execution hooks, named after external operations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SkillHooks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<String>,
}

/// Raw, serde-friendly skill definition as supplied at registration time.
///
/// Converted into a [`Skill`] by [`SkillRegistry::register`], which compiles
/// `trigger_regex` and rejects invalid patterns.
///
/// [`SkillRegistry::register`]: crate::skills::SkillRegistry::register
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillSpec {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub trigger_regex: String,
    #[serde(default)]
    pub intent_rules: Vec<String>,
    /// Static match multiplier in `0..=1`. Defaults to 0.5 when unset.
    #[serde(default)]
    pub weight: Option<f64>,
    /// Advisory trust score in `0..=100`.
    #[serde(default)]
    pub confidence: f64,
    #[serde(default = "default_status")]
    pub status: SkillStatus,
    #[serde(default)]
    pub success_count: u64,
    #[serde(default)]
    pub total_activations: u64,
    #[serde(default)]
    pub hooks: SkillHooks,
}

fn default_status() -> SkillStatus {
    SkillStatus::Standby
}

/// Weight applied when a spec does not set one.
pub const DEFAULT_WEIGHT: f64 = 0.5;

/// A registered skill with its trigger pattern compiled.
///
/// `weight` and `confidence` are deliberately distinct: `weight` is the
/// static multiplier read by the matcher, while `confidence` is adjusted on
/// successful activations and never fed back into ranking.
#[derive(Debug, Clone)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub trigger_pattern: String,
    pub trigger: Regex,
    pub intent_rules: Vec<String>,
    pub weight: f64,
    pub confidence: f64,
    pub status: SkillStatus,
    pub success_count: u64,
    pub total_activations: u64,
    pub last_adjustment: DateTime<Utc>,
    pub hooks: SkillHooks,
}

impl Skill {
    /// Compile a spec into a skill.
    ///
    /// # Errors
    ///
    /// Returns [`NexusError::Pattern`] if `trigger_regex` does not compile.
    pub fn compile(spec: SkillSpec) -> Result<Self> {
        let trigger = RegexBuilder::new(&spec.trigger_regex)
            .case_insensitive(true)
            .build()
            .map_err(|e| NexusError::pattern(spec.id.clone(), e))?;
        Ok(Self {
            trigger,
            trigger_pattern: spec.trigger_regex,
            id: spec.id,
            name: spec.name,
            description: spec.description,
            icon: spec.icon,
            intent_rules: spec.intent_rules,
            weight: spec.weight.unwrap_or(DEFAULT_WEIGHT),
            confidence: spec.confidence,
            status: spec.status,
            success_count: spec.success_count,
            total_activations: spec.total_activations,
            last_adjustment: Utc::now(),
            hooks: spec.hooks,
        })
    }

    /// Record a successful activation: bump counters, nudge confidence.
    pub fn record_success(&mut self) {
        self.total_activations += 1;
        self.success_count += 1;
        self.confidence = (self.confidence + 0.5).min(100.0);
        self.last_adjustment = Utc::now();
    }
}
