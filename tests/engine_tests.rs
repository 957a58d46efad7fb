//! End-to-end tests for the session engine through the manager and actor.

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;

use common::MockProvider;
use nexus::audit::{AuditLevel, AuditLog};
use nexus::config::NexusConfig;
use nexus::matching;
use nexus::resilience::{BreakerState, ScriptedFailureSource};
use nexus::session::{SessionManager, GATE_LOCKED_REPLY};
use nexus::skills::{SkillHooks, SkillRegistry, SkillSpec, SkillStatus};
use nexus::types::Role;

fn spec(id: &str, pattern: &str, rules: &[&str], weight: f64) -> SkillSpec {
    SkillSpec {
        id: id.to_string(),
        name: id.to_string(),
        description: String::new(),
        icon: String::new(),
        trigger_regex: pattern.to_string(),
        intent_rules: rules.iter().map(|r| r.to_string()).collect(),
        weight: Some(weight),
        confidence: 50.0,
        status: SkillStatus::Active,
        success_count: 0,
        total_activations: 0,
        hooks: SkillHooks::default(),
    }
}

fn manager_with_signals(
    provider: Arc<MockProvider>,
    signals: Vec<bool>,
) -> SessionManager {
    SessionManager::with_failure_sources(
        NexusConfig::new(),
        provider,
        Arc::new(move || Box::new(ScriptedFailureSource::new(signals.clone()))),
    )
}

// Scenario A from the routing design: a rule-substring hit scores
// 1 × weight and wins the ranking.
#[test]
fn rule_hit_ranks_python_dev_first() {
    let mut registry = SkillRegistry::new();
    registry
        .register(spec("python-dev", r"\.py", &["run pytest"], 0.85))
        .unwrap();
    registry
        .register(spec("web-deploy", "deploy", &[], 0.98))
        .unwrap();

    let ranked = matching::rank("please run pytest now", &registry);

    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].skill_id, "python-dev");
    assert!((ranked[0].rank - 0.85).abs() < 1e-9);
}

// Scenario B: a regex hit scores 2 × weight and outranks any
// rule-substring-only hit.
#[test]
fn regex_hit_outranks_rule_hits() {
    let mut registry = SkillRegistry::new();
    registry
        .register(spec("rules-only", "zzz", &["deploy to"], 1.0))
        .unwrap();
    registry
        .register(spec("deploy-github", "deploy|push|release", &[], 0.98))
        .unwrap();

    let ranked = matching::rank("deploy to production", &registry);

    assert_eq!(ranked[0].skill_id, "deploy-github");
    assert!((ranked[0].rank - 1.96).abs() < 1e-9);
    assert!(ranked[0].rank > ranked[1].rank);
}

// Scenario C: three failed evaluations open the breaker; the next call,
// regardless of text, gets the fixed lock reply and no skill activation.
#[tokio::test]
async fn open_breaker_locks_out_the_fourth_call() {
    let provider = MockProvider::new();
    let manager = manager_with_signals(provider.clone(), vec![true, true, true, true]);
    let session = manager.get_or_create("scenario-c").await;

    session.handle_message("one").await.unwrap();
    session.handle_message("two").await.unwrap();
    let third = session.handle_message("three").await.unwrap();
    assert!(third.refused);

    let audit_before = third.state.audit.len();
    let fourth = session.handle_message("deploy the worker").await.unwrap();

    assert!(fourth.refused);
    assert_eq!(fourth.reply.content, GATE_LOCKED_REPLY);
    assert_eq!(fourth.state.resilience.breaker, BreakerState::Open);
    // Only two turns ever reached the provider.
    assert_eq!(provider.call_count(), 2);
    // The refused turn logged a Warning, never a SkillActivate.
    assert_eq!(fourth.state.audit.len(), audit_before + 1);
    assert_eq!(fourth.state.audit.entries()[0].level, AuditLevel::Warning);
}

// Scenario D: clear resets the conversation but not resilience or audit.
#[tokio::test]
async fn clear_preserves_resilience_and_audit() {
    let provider = MockProvider::new();
    let manager = manager_with_signals(provider, vec![true]);
    let session = manager.get_or_create("scenario-d").await;

    session.handle_message("deploy the worker").await.unwrap();
    let before = session.state().await.unwrap();
    assert!(!before.messages.is_empty());
    assert!(!before.active_skills.is_empty());

    let cleared = session.clear().await.unwrap();

    assert!(cleared.messages.is_empty());
    assert!(cleared.active_skills.is_empty());
    assert!(cleared.suggested_skills.is_empty());
    assert_eq!(cleared.resilience.consecutive_failures, 1);
    assert_eq!(cleared.resilience.retry_count, 1);
    assert_eq!(cleared.audit.len(), before.audit.len());
}

#[tokio::test]
async fn full_recovery_needs_two_clean_turns() {
    let provider = MockProvider::new();
    let manager =
        manager_with_signals(provider, vec![true, true, true, false, false]);
    let session = manager.get_or_create("recovery").await;

    for text in ["a", "b", "c"] {
        session.handle_message(text).await.unwrap();
    }
    assert_eq!(
        session.state().await.unwrap().resilience.breaker,
        BreakerState::Open
    );

    let fourth = session.handle_message("d").await.unwrap();
    assert!(!fourth.refused);
    assert_eq!(fourth.state.resilience.breaker, BreakerState::HalfOpen);

    let fifth = session.handle_message("e").await.unwrap();
    assert_eq!(fifth.state.resilience.breaker, BreakerState::Closed);
    assert_eq!(fifth.state.resilience.consecutive_failures, 0);
}

#[tokio::test]
async fn matched_skills_flow_into_the_prompt_and_stats() {
    let provider = MockProvider::new();
    provider.queue_response("Deployment queued.");
    let manager = manager_with_signals(provider.clone(), vec![]);
    let session = manager.get_or_create("prompt-flow").await;

    let outcome = session.handle_message("deploy the worker").await.unwrap();

    assert_eq!(outcome.reply.content, "Deployment queued.");
    assert_eq!(outcome.reply.skill_insight.as_deref(), Some("web-deploy"));

    let request = provider.last_request().unwrap();
    assert_eq!(request.messages[0].role, Role::System);
    assert!(request.messages[0]
        .content
        .contains("[CONTEXT COMPRESSION ACTIVE]"));
    assert!(request.messages[0].content.contains("web-deploy"));

    let skill = outcome.state.skills.get("web-deploy").unwrap();
    assert_eq!(skill.total_activations, 113);
    assert!((skill.confidence - 78.5).abs() < 1e-9);
}

#[tokio::test]
async fn tool_calls_are_recorded_on_the_reply() {
    let provider = MockProvider::new();
    provider.queue_tool_call("call-1", "get_status", serde_json::json!({"node": "alpha"}));
    let manager = manager_with_signals(provider, vec![]);
    let session = manager.get_or_create("tools").await;

    let outcome = session.handle_message("node status please").await.unwrap();

    assert_eq!(outcome.reply.tool_calls.len(), 1);
    assert_eq!(outcome.reply.tool_calls[0].name, "get_status");
}

#[tokio::test]
async fn disabled_skill_is_never_suggested() {
    let provider = MockProvider::new();
    let manager = manager_with_signals(provider, vec![]);
    let session = manager.get_or_create("toggle").await;

    session.toggle_skill("web-deploy").await.unwrap();
    let outcome = session.handle_message("deploy the worker").await.unwrap();

    assert!(outcome.state.active_skills.is_empty());
    assert!(outcome.reply.skill_insight.is_none());
}

#[tokio::test]
async fn audit_history_window_excludes_system_logs() {
    let provider = MockProvider::new();
    let manager = manager_with_signals(provider.clone(), vec![true, false]);
    let session = manager.get_or_create("window").await;

    session.handle_message("first").await.unwrap();
    session.handle_message("second").await.unwrap();

    let request = provider.last_request().unwrap();
    assert!(request
        .messages
        .iter()
        .all(|m| !m.content.contains("[RESILIENCE]")));
}

// Audit cap property: appending 150 entries to a capacity-100 ledger leaves
// exactly the 100 most recent.
#[test]
fn audit_cap_drops_the_oldest_fifty() {
    let mut log = AuditLog::new(100);
    for i in 0..150 {
        log.append(AuditLevel::Info, format!("entry {i}"));
    }
    assert_eq!(log.len(), 100);
    assert_eq!(log.entries()[0].message, "entry 149");
    assert_eq!(log.entries()[99].message, "entry 50");
}
