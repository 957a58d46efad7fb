//! Configuration system (layered: code > env > defaults).

use bon::Builder;

/// Default chat model routed to the completion gateway.
pub const DEFAULT_MODEL: &str = "google-ai-studio/gemini-2.5-flash";

/// Tunables for the session engine.
///
/// Defaults mirror the control plane's production values: the breaker opens
/// after three consecutive failures, the audit ledger keeps 100 entries, and
/// the provider sees the last five conversation turns.
#[derive(Debug, Clone, Builder)]
pub struct EngineSettings {
    /// Consecutive failures required to open the circuit breaker.
    #[builder(default = 3)]
    pub breaker_threshold: u32,
    /// Maximum audit entries retained per session.
    #[builder(default = 100)]
    pub audit_capacity: usize,
    /// Maximum conversation messages retained per session.
    #[builder(default = 200)]
    pub history_capacity: usize,
    /// Conversation messages forwarded to the completion provider.
    #[builder(default = 5)]
    pub history_window: usize,
    /// Probability used by the default random failure source.
    #[builder(default = 0.02)]
    pub failure_rate: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Configuration for the Nexus engine.
#[derive(Debug, Clone)]
pub struct NexusConfig {
    base_url: Option<String>,
    api_key: Option<String>,
    model: String,
    settings: EngineSettings,
}

impl Default for NexusConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl NexusConfig {
    /// Create an empty config with default engine settings.
    pub fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            settings: EngineSettings::default(),
        }
    }

    /// Load from environment variables (`NEXUS_AI_BASE_URL`, `NEXUS_AI_API_KEY`,
    /// `NEXUS_MODEL`), reading `.env` if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut config = Self::new();

        if let Ok(url) = std::env::var("NEXUS_AI_BASE_URL") {
            config.base_url = Some(url);
        }
        if let Ok(key) = std::env::var("NEXUS_AI_API_KEY") {
            config.api_key = Some(key);
        }
        if let Ok(model) = std::env::var("NEXUS_MODEL") {
            config.model = model;
        }

        config
    }

    /// Set the completion gateway base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the default model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override engine settings.
    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }
}
