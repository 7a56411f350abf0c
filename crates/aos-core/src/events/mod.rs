//! Event bus and the ops pipeline that consumes it.

pub mod bus;
pub mod ingress;
pub mod pipeline;

pub use bus::{BusError, EventSink, InMemoryEventBus};
pub use ingress::parse_event_line;
pub use pipeline::OpsPipeline;
