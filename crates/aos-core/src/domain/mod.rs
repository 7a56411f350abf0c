//! Domain models for AOS.
//!
//! Canonical definitions for the core entities:
//! - `AgentProfile`: a registered, role-scoped agent
//! - `AgentMessage` / `TaskInput`: work routed to an agent
//! - `ExecutionResult`: the outcome of one reasoning-loop run
//! - `Event`: a named signal on the event bus

pub mod agent;
pub mod error;
pub mod event;
pub mod execution;
pub mod message;

// Re-export main types and errors
pub use agent::{AgentProfile, AgentTier};
pub use error::{AosError, ConfigError, Result};
pub use event::{kinds, Event, Severity};
pub use execution::{Escalation, ExecutionResult};
pub use message::{AgentMessage, MessageTarget, TaskInput};
