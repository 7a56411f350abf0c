//! Per-agent short-term memory.
//!
//! Each agent owns a bounded rolling window of recent exchanges, keyed by
//! agent name in a [`MemoryStore`]. Oldest entries are evicted first.

pub mod store;
pub mod window;

pub use store::MemoryStore;
pub use window::{AgentMemory, MemoryEntry, MemoryRole};
