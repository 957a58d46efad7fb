//! Per-session state, turn pipeline, and the actor that serializes turns.

pub mod actor;
pub mod engine;
pub mod manager;
pub mod state;

pub use actor::SessionHandle;
pub use engine::{SessionEngine, TurnOutcome, GATE_LOCKED_REPLY};
pub use manager::SessionManager;
pub use state::SessionState;
