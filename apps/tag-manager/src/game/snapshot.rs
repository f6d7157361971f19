use serde::Serialize;
use std::collections::BTreeMap;

use super::notifications::PostValue;
use crate::domain::agent::AgentRecord;
use crate::domain::tag::{AgentClass, TagRules, TagState};
use crate::domain::zone::Zone;

/// Per-category counters for dropped or suspicious traffic
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub reports_received: u64,
    pub reports_dropped: u64,
    pub unknown_vehicle_requests: u64,
    pub unhandled_mail: u64,
    pub config_warnings: u64,
    pub run_warnings: u64,
}

/// One agent as seen from outside the game loop
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentStatus {
    #[serde(flatten)]
    pub record: AgentRecord,
    pub class: AgentClass,
    pub reports: u64,
    pub tag: TagState,
    /// Seconds left on the current tag
    pub time_remaining: Option<f64>,
}

/// A post as kept in the recent-posts ring
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishedPost {
    pub seq: u64,
    pub time: f64,
    pub key: String,
    pub value: PostValue,
}

/// Read-only picture of the field after a cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldSnapshot {
    pub cycle: u64,
    pub time: f64,
    /// Seconds since the game started
    pub elapsed: f64,
    pub tagged: Vec<String>,
    pub agents: Vec<AgentStatus>,
    pub teams: BTreeMap<String, Vec<String>>,
    pub zones: Vec<Zone>,
    pub rules: Option<TagRules>,
    pub tag_events: u64,
    pub diagnostics: Diagnostics,
    /// Oldest first
    pub recent_posts: Vec<PublishedPost>,
}

impl FieldSnapshot {
    pub fn agent(&self, name: &str) -> Option<&AgentStatus> {
        self.agents.iter().find(|status| status.record.name() == name)
    }

    /// Recent posts with a sequence number above `after`
    pub fn posts_after(&self, after: u64) -> Vec<PublishedPost> {
        self.recent_posts
            .iter()
            .filter(|post| post.seq > after)
            .cloned()
            .collect()
    }
}
