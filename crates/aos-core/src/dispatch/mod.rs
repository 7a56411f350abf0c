//! Agent registry, keyword routing and task dispatch.

pub mod dispatcher;
pub mod registry;
pub mod routing;

pub use dispatcher::{AgentStatus, TaskDispatcher};
pub use registry::AgentRegistry;
pub use routing::{RoutingRule, RoutingTable};
