use super::state::TagState;
use super::store::TagStateStore;
use super::value_objects::{Candidate, RejectReason};
use crate::domain::agent::{AgentRegistry, Position};
use crate::domain::zone::ZoneCatalog;
use serde::Serialize;

/// Tunable game rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TagRules {
    /// Maximum tagger-to-target range for a tag to land (meters)
    pub tag_range: f64,
    /// Minimum time between successful tags by the same agent (seconds)
    pub min_interval: f64,
    /// How long a tag lasts before it expires (seconds)
    pub duration: f64,
}

impl Default for TagRules {
    fn default() -> Self {
        Self {
            tag_range: 25.0,
            min_interval: 10.0,
            duration: 30.0,
        }
    }
}

impl TagRules {
    /// Requester-side gates, evaluated in order with the first failure winning
    ///
    /// 1. The requester must not be tagged itself
    /// 2. The requester's last successful tag must be at least
    ///    `min_interval` old (an agent that never tagged passes)
    /// 3. The requester must stand inside its own team's zone
    pub fn check_gates(
        &self,
        state: Option<&TagState>,
        team: Option<&str>,
        position: Position,
        zones: &ZoneCatalog,
        now: f64,
    ) -> Result<(), RejectReason> {
        if state.is_some_and(|s| s.now_tagged) {
            return Err(RejectReason::SelfTagged);
        }

        if let Some(last) = state.and_then(|s| s.last_own_tag) {
            if now - last < self.min_interval {
                return Err(RejectReason::Frequency);
            }
        }

        if !zones.in_home_zone(team, position) {
            return Err(RejectReason::Zone);
        }

        Ok(())
    }

    /// Untagged opponents inside the requester's home zone
    ///
    /// Sorted by ascending range; equal ranges fall back to ascending name,
    /// so the first entry is the deterministic nearest target.
    pub fn candidates(
        &self,
        requester: &str,
        team: Option<&str>,
        from: Position,
        registry: &AgentRegistry,
        zones: &ZoneCatalog,
        store: &TagStateStore,
    ) -> Vec<Candidate> {
        let Some(home) = team.and_then(|team| zones.home_zone(team)) else {
            return Vec::new();
        };

        let mut candidates: Vec<Candidate> = registry
            .iter()
            .filter(|record| record.name() != requester)
            .filter(|record| record.team() != team)
            .filter(|record| !store.is_tagged(record.name()))
            .filter(|record| home.contains(record.position()))
            .map(|record| Candidate {
                name: record.name().to_string(),
                kind: record.kind().to_string(),
                range: from.range_to(record.position()),
            })
            .collect();

        candidates.sort_by(|a, b| a.range.total_cmp(&b.range).then_with(|| a.name.cmp(&b.name)));
        candidates
    }

    pub fn in_range(&self, candidate: &Candidate) -> bool {
        candidate.range <= self.tag_range
    }

    /// A tag placed at `tagged_at` has run its course by `now`
    pub fn is_expired(&self, tagged_at: f64, now: f64) -> bool {
        now - tagged_at >= self.duration
    }
}
