use super::value_objects::RejectReason;
use serde::{Deserialize, Serialize};

/// Why an agent is currently tagged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagReason {
    #[default]
    None,
    /// Tagged by an opponent
    Enemy,
    /// Left the field
    Boundary,
}

impl std::fmt::Display for TagReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagReason::None => write!(f, "none"),
            TagReason::Enemy => write!(f, "enemy"),
            TagReason::Boundary => write!(f, "boundary"),
        }
    }
}

/// Per-agent statistics, from both the tagger's and the target's side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCounters {
    pub requested: u32,
    pub accepted: u32,
    pub succeeded: u32,
    pub rejected_zone: u32,
    pub rejected_freq: u32,
    pub rejected_self: u32,
    pub times_tagged: u32,
}

/// Everything the game tracks about one agent besides its position
///
/// # Invariants
/// - `tagged_at` is set exactly when `now_tagged` is true
/// - `reason` is `None` exactly when `now_tagged` is false
/// - `last_own_tag` only moves on a successful tag by this agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagState {
    pub now_tagged: bool,
    pub reason: TagReason,
    pub tagged_at: Option<f64>,
    pub last_own_tag: Option<f64>,
    /// Last published advisory eligibility; `None` until first computed
    pub can_tag: Option<bool>,
    /// Last published on-field status; `None` until first swept
    pub on_field: Option<bool>,
    pub counters: TagCounters,
}

impl TagState {
    /// Marks the agent tagged; returns false if it already was
    pub fn mark_tagged(&mut self, reason: TagReason, now: f64) -> bool {
        if self.now_tagged {
            return false;
        }
        self.now_tagged = true;
        self.reason = reason;
        self.tagged_at = Some(now);
        self.counters.times_tagged += 1;
        true
    }

    /// Clears the tag; returns false if the agent was not tagged
    pub fn release(&mut self) -> bool {
        if !self.now_tagged {
            return false;
        }
        self.now_tagged = false;
        self.reason = TagReason::None;
        self.tagged_at = None;
        true
    }

    pub fn record_rejection(&mut self, reason: RejectReason) {
        match reason {
            RejectReason::SelfTagged => self.counters.rejected_self += 1,
            RejectReason::Frequency => self.counters.rejected_freq += 1,
            RejectReason::Zone => self.counters.rejected_zone += 1,
        }
    }

    /// Seconds until the tag expires, or `None` when untagged
    pub fn time_remaining(&self, duration: f64, now: f64) -> Option<f64> {
        self.tagged_at
            .filter(|_| self.now_tagged)
            .map(|at| (duration - (now - at)).max(0.0))
    }
}
