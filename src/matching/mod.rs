//! Intent ranking: pure scoring of a user query against the skill catalog.

use serde::{Deserialize, Serialize};

use crate::skills::{SkillRegistry, SkillStatus};

/// Score contribution of one contained intent rule.
const RULE_HIT: u32 = 1;
/// Score contribution of a trigger-regex hit.
const REGEX_HIT: u32 = 2;

/// A candidate skill for a query, ordered by descending rank.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedMatch {
    pub skill_id: String,
    pub rank: f64,
}

/// Rank all non-disabled skills against a query.
///
/// Pure and deterministic: each contained intent rule adds 1 to the score, a
/// trigger-regex hit adds 2, and the total is multiplied by the skill's
/// weight. Only ranks above zero are retained, sorted descending with ties
/// kept in registry order. An empty query yields an empty list.
pub fn rank(query: &str, skills: &SkillRegistry) -> Vec<RankedMatch> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }
    let lowered = query.to_lowercase();

    let mut matches: Vec<RankedMatch> = skills
        .iter()
        .filter(|skill| skill.status != SkillStatus::Disabled)
        .filter_map(|skill| {
            let mut score = 0u32;
            for rule in &skill.intent_rules {
                if lowered.contains(&rule.to_lowercase()) {
                    score += RULE_HIT;
                }
            }
            if skill.trigger.is_match(query) {
                score += REGEX_HIT;
            }
            let rank = f64::from(score) * skill.weight;
            (rank > 0.0).then(|| RankedMatch {
                skill_id: skill.id.clone(),
                rank,
            })
        })
        .collect();

    // Stable sort keeps registry order for equal ranks.
    matches.sort_by(|a, b| b.rank.partial_cmp(&a.rank).unwrap_or(std::cmp::Ordering::Equal));
    matches
}
