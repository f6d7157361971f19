// Game core: the tag cycle and everything it needs around the domain

pub mod arbiter;
pub mod errors;
pub mod field;
pub mod manager;
pub mod messages;
pub mod notifications;
pub mod snapshot;
pub mod sweepers;
pub mod visuals;

pub use errors::{TagError, TagResult};
pub use manager::TagManager;
pub use messages::{InboundMessage, MailEnvelope};
pub use notifications::{Post, PostValue};
pub use snapshot::{AgentStatus, Diagnostics, FieldSnapshot, PublishedPost};
