use super::rules::TagRules;
use super::state::{TagReason, TagState};
use crate::domain::agent::AgentRegistry;
use crate::domain::zone::ZoneCatalog;
use std::collections::BTreeMap;

/// One [`TagState`] per agent, keyed by agent name
///
/// Mutated only by the arbiter and the sweepers; everything else reads.
#[derive(Debug, Default, Clone)]
pub struct TagStateStore {
    states: BTreeMap<String, TagState>,
}

impl TagStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&TagState> {
        self.states.get(name)
    }

    /// State for an agent, created untagged on first access
    pub fn entry(&mut self, name: &str) -> &mut TagState {
        self.states.entry(name.to_string()).or_default()
    }

    pub fn is_tagged(&self, name: &str) -> bool {
        self.states.get(name).is_some_and(|s| s.now_tagged)
    }

    /// Tags an agent; returns false if it was already tagged
    pub fn tag(&mut self, name: &str, reason: TagReason, now: f64) -> bool {
        self.entry(name).mark_tagged(reason, now)
    }

    /// Releases an agent; returns false if it was not tagged
    pub fn release(&mut self, name: &str) -> bool {
        self.states.get_mut(name).is_some_and(|s| s.release())
    }

    /// Names of currently tagged agents in ascending order
    pub fn tagged_names(&self) -> Vec<String> {
        self.states
            .iter()
            .filter(|(_, state)| state.now_tagged)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagState)> {
        self.states.iter().map(|(name, state)| (name.as_str(), state))
    }

    /// Side-effect free prediction of whether `name` could tag right now
    ///
    /// Same gates the arbiter applies, plus at least one candidate within
    /// tag range. Unknown agents are never eligible.
    pub fn is_eligible_to_tag(
        &self,
        name: &str,
        registry: &AgentRegistry,
        zones: &ZoneCatalog,
        rules: &TagRules,
        now: f64,
    ) -> bool {
        let Some(record) = registry.get(name) else {
            return false;
        };

        if rules
            .check_gates(self.get(name), record.team(), record.position(), zones, now)
            .is_err()
        {
            return false;
        }

        rules
            .candidates(name, record.team(), record.position(), registry, zones, self)
            .first()
            .is_some_and(|nearest| rules.in_range(nearest))
    }
}
