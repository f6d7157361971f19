use super::state::TagReason;
use super::value_objects::{AgentClass, TagResolution};

/// Why a tag ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseCause {
    /// The tag ran for its full duration
    Expired,
    /// An untag request arrived for the agent
    Requested,
}

/// Domain events produced by the arbiter and the sweepers
///
/// Events describe state changes that already happened; turning them into
/// outbound posts is the notification side's job.
///
/// # Example
/// ```
/// use tag_manager::domain::tag::events::TagEvent;
/// use tag_manager::domain::tag::{AgentClass, TagReason};
///
/// let event = TagEvent::Tagged {
///     source: None,
///     target: "gus".to_string(),
///     reason: TagReason::Boundary,
///     class: AgentClass::Robot,
/// };
///
/// assert_eq!(event.agent(), "gus");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum TagEvent {
    /// A queued tag request was resolved
    Resolved(TagResolution),
    /// An agent became tagged
    Tagged {
        /// Tagging agent; `None` for boundary tags
        source: Option<String>,
        target: String,
        reason: TagReason,
        class: AgentClass,
    },
    /// A tag ended
    Released {
        target: String,
        class: AgentClass,
        cause: ReleaseCause,
    },
    /// Advisory eligibility was computed for the first time or flipped
    CanTagChanged { agent: String, can_tag: bool },
    /// On-field status was computed for the first time or flipped
    OnFieldChanged { agent: String, on_field: bool },
}

impl TagEvent {
    /// The agent this event is primarily about
    pub fn agent(&self) -> &str {
        match self {
            TagEvent::Resolved(resolution) => &resolution.request.requester,
            TagEvent::Tagged { target, .. } => target,
            TagEvent::Released { target, .. } => target,
            TagEvent::CanTagChanged { agent, .. } => agent,
            TagEvent::OnFieldChanged { agent, .. } => agent,
        }
    }
}
