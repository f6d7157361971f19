use crate::config::TagConfig;
use crate::domain::agent::AgentRegistry;
use crate::domain::tag::{AgentClass, TagRules};
use crate::domain::zone::ZoneCatalog;

/// Read-only view of the field shared by the arbiter and the sweepers
#[derive(Debug, Clone, Copy)]
pub struct FieldView<'a> {
    pub registry: &'a AgentRegistry,
    pub zones: &'a ZoneCatalog,
    pub rules: &'a TagRules,
    pub human_platform: &'a str,
}

impl<'a> FieldView<'a> {
    pub fn new(registry: &'a AgentRegistry, config: &'a TagConfig) -> Self {
        Self {
            registry,
            zones: &config.zones,
            rules: &config.rules,
            human_platform: &config.human_platform,
        }
    }

    /// Human or robot, by the agent's last reported platform type
    ///
    /// Agents without a record count as robots.
    pub fn class_of(&self, name: &str) -> AgentClass {
        self.registry
            .get(name)
            .map(|record| AgentClass::of(record.kind(), self.human_platform))
            .unwrap_or(AgentClass::Robot)
    }
}
