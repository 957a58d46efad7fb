//! Skill catalog: routable capabilities with matching rules and
//! activation statistics.

pub mod registry;
pub mod skill;

pub use registry::SkillRegistry;
pub use skill::{Skill, SkillHooks, SkillSpec, SkillStatus};
