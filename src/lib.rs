//! Nexus — intent-routing and resilience engine for the Nexus control plane.
//!
//! Given a free-text command, the engine ranks which skill module should
//! handle it, consults a circuit-breaker state machine that can lock out
//! processing after repeated failures, delegates to an external completion
//! provider, and records every state transition in a capped audit ledger.
//! One independent actor owns each session's state.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use nexus::completion::OpenAiCompatibleProvider;
//! use nexus::config::NexusConfig;
//! use nexus::session::SessionManager;
//!
//! # async fn example() -> nexus::error::Result<()> {
//! let config = NexusConfig::from_env();
//! let provider = Arc::new(OpenAiCompatibleProvider::new(
//!     "https://gateway.example.com/v1",
//!     "api-key",
//! ));
//! let sessions = SessionManager::new(config, provider);
//!
//! let session = sessions.get_or_create("operator-1").await;
//! let outcome = session.handle_message("deploy the worker").await?;
//! println!("{}", outcome.reply.content);
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod completion;
pub mod config;
pub mod error;
pub mod matching;
pub mod prelude;
pub mod resilience;
pub mod session;
pub mod skills;
pub mod types;
pub mod workflow;
