//! Session lifecycle management.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::completion::CompletionProvider;
use crate::config::NexusConfig;
use crate::resilience::{FailureSource, RandomFailureSource};
use crate::skills::SkillRegistry;

use super::actor::SessionHandle;
use super::engine::SessionEngine;

/// Factory producing one failure source per session.
pub type FailureSourceFactory = Arc<dyn Fn() -> Box<dyn FailureSource> + Send + Sync>;

/// Manages independent session actors keyed by session id.
///
/// Sessions are created on first access and live until [`remove`] is called.
///
/// [`remove`]: SessionManager::remove
pub struct SessionManager {
    config: NexusConfig,
    provider: Arc<dyn CompletionProvider>,
    failure_sources: FailureSourceFactory,
    sessions: Mutex<HashMap<String, SessionHandle>>,
}

impl SessionManager {
    /// Create a manager with the default random failure source.
    pub fn new(config: NexusConfig, provider: Arc<dyn CompletionProvider>) -> Self {
        let rate = config.settings().failure_rate;
        Self::with_failure_sources(
            config,
            provider,
            Arc::new(move || Box::new(RandomFailureSource::new(rate))),
        )
    }

    /// Create a manager with an injected failure-source factory.
    pub fn with_failure_sources(
        config: NexusConfig,
        provider: Arc<dyn CompletionProvider>,
        failure_sources: FailureSourceFactory,
    ) -> Self {
        Self {
            config,
            provider,
            failure_sources,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Get the session for an id, creating it on first access.
    pub async fn get_or_create(&self, session_id: &str) -> SessionHandle {
        let mut sessions = self.sessions.lock().await;
        if let Some(handle) = sessions.get(session_id) {
            return handle.clone();
        }
        info!(session = session_id, "session created");
        let engine = SessionEngine::new(
            session_id,
            self.config.model(),
            SkillRegistry::with_defaults(),
            self.provider.clone(),
            (self.failure_sources)(),
            self.config.settings().clone(),
        );
        let handle = SessionHandle::spawn(engine);
        sessions.insert(session_id.to_string(), handle.clone());
        handle
    }

    /// Get an existing session.
    pub async fn get(&self, session_id: &str) -> Option<SessionHandle> {
        self.sessions.lock().await.get(session_id).cloned()
    }

    /// Remove a session, cancelling its actor and any pending workflow
    /// stages.
    pub async fn remove(&self, session_id: &str) -> bool {
        let handle = self.sessions.lock().await.remove(session_id);
        match handle {
            Some(handle) => {
                handle.close();
                info!(session = session_id, "session removed");
                true
            }
            None => false,
        }
    }

    /// Ids of all live sessions.
    pub async fn session_ids(&self) -> Vec<String> {
        self.sessions.lock().await.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use crate::completion::{CompletionRequest, CompletionResponse};
    use crate::error::Result;

    use super::*;

    struct NullProvider;

    #[async_trait]
    impl CompletionProvider for NullProvider {
        fn provider_name(&self) -> &str {
            "null"
        }

        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> Result<CompletionResponse> {
            Ok(CompletionResponse {
                content: "ok".into(),
                tool_calls: vec![],
            })
        }
    }

    fn manager() -> SessionManager {
        SessionManager::new(NexusConfig::new(), Arc::new(NullProvider))
    }

    #[tokio::test]
    async fn get_or_create_reuses_sessions() {
        let manager = manager();
        let a = manager.get_or_create("s-1").await;
        a.handle_message("hello").await.unwrap();
        let b = manager.get_or_create("s-1").await;
        assert_eq!(b.state().await.unwrap().messages.len(), 2);
    }

    #[tokio::test]
    async fn sessions_are_independent() {
        let manager = manager();
        let a = manager.get_or_create("s-a").await;
        let b = manager.get_or_create("s-b").await;
        a.handle_message("only for a").await.unwrap();
        assert_eq!(a.state().await.unwrap().messages.len(), 2);
        assert!(b.state().await.unwrap().messages.is_empty());
    }

    #[tokio::test]
    async fn get_returns_none_for_unknown() {
        let manager = manager();
        assert!(manager.get("ghost").await.is_none());
    }

    #[tokio::test]
    async fn remove_closes_the_session() {
        let manager = manager();
        let handle = manager.get_or_create("s-1").await;
        assert!(manager.remove("s-1").await);
        assert!(!manager.remove("s-1").await);
        tokio::task::yield_now().await;
        assert!(handle.state().await.is_err());
    }

    #[tokio::test]
    async fn session_ids_lists_live_sessions() {
        let manager = manager();
        manager.get_or_create("one").await;
        manager.get_or_create("two").await;
        let mut ids = manager.session_ids().await;
        ids.sort();
        assert_eq!(ids, ["one", "two"]);
    }
}
