//! Reasoning loop: completion call, reply classification, tool execution,
//! repeat. Bounded by `max_iterations`.

pub mod engine;
pub mod prompt;
pub mod reply;

pub use engine::ReasoningEngine;
pub use prompt::{build_system_context, PromptContext};
pub use reply::{parse_reply, AgentReply, ToolRequest};
