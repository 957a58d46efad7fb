//! Core message and tool-call types.

pub mod message;

pub use message::{ChatMessage, Role, ToolCall};
