// Agent domain module
// Contains the agent record, the registry of latest known state, and the
// inbound position report value object

pub mod record;
pub mod registry;
pub mod value_objects;

// Re-export main types for convenience
pub use record::AgentRecord;
pub use registry::{AgentRegistry, TeamBinding};
pub use value_objects::{Position, PositionReport};
