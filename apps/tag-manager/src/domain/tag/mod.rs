// Tag domain module
// Per-agent tag state, the rules that gate tagging, and the events that
// state changes produce

pub mod events;
pub mod rules;
pub mod state;
pub mod store;
pub mod value_objects;

// Re-export main types for convenience
pub use events::{ReleaseCause, TagEvent};
pub use rules::TagRules;
pub use state::{TagCounters, TagReason, TagState};
pub use store::TagStateStore;
pub use value_objects::{
    AgentClass, Candidate, RejectReason, TagOutcome, TagRequest, TagResolution,
};
