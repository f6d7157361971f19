use super::record::AgentRecord;
use std::collections::{BTreeMap, BTreeSet};

/// How a stored report relates to the configured teams
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamBinding {
    /// Agent is on one of the configured teams
    Member,
    /// Report carried no team
    NoTeam,
    /// Report named a team that is not configured
    UnknownTeam(String),
}

/// Latest known state of every agent, keyed by name
///
/// Records are never removed. The team roster is derived from the records:
/// an agent sits on the roster of the team named in its most recent report,
/// provided that team is configured.
#[derive(Debug, Default, Clone)]
pub struct AgentRegistry {
    records: BTreeMap<String, AgentRecord>,
    report_counts: BTreeMap<String, u64>,
    roster: BTreeMap<String, BTreeSet<String>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a record, replacing any previous one for the same name
    ///
    /// The record is always stored; the returned binding tells the caller
    /// whether the agent joined a configured team.
    pub fn update_agent(&mut self, record: AgentRecord, teams: &[&str]) -> TeamBinding {
        let name = record.name().to_string();

        for members in self.roster.values_mut() {
            members.remove(&name);
        }

        let binding = match record.team() {
            None => TeamBinding::NoTeam,
            Some(team) if teams.contains(&team) => {
                self.roster
                    .entry(team.to_string())
                    .or_default()
                    .insert(name.clone());
                TeamBinding::Member
            }
            Some(team) => TeamBinding::UnknownTeam(team.to_string()),
        };

        *self.report_counts.entry(name.clone()).or_insert(0) += 1;
        self.records.insert(name, record);
        binding
    }

    pub fn get(&self, name: &str) -> Option<&AgentRecord> {
        self.records.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    /// Records in ascending name order
    pub fn iter(&self) -> impl Iterator<Item = &AgentRecord> {
        self.records.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of valid reports received for an agent
    pub fn report_count(&self, name: &str) -> u64 {
        self.report_counts.get(name).copied().unwrap_or(0)
    }

    /// Team name to member names; teams that lost every member are omitted
    pub fn roster(&self) -> BTreeMap<String, Vec<String>> {
        self.roster
            .iter()
            .filter(|(_, members)| !members.is_empty())
            .map(|(team, members)| (team.clone(), members.iter().cloned().collect()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::PositionReport;

    const TEAMS: [&str; 2] = ["red", "blue"];

    fn record(name: &str, team: Option<&str>, x: f64) -> AgentRecord {
        let report = PositionReport {
            name: Some(name.to_string()),
            team: team.map(str::to_string),
            kind: Some("kayak".to_string()),
            x: Some(x),
            y: Some(0.0),
            ..Default::default()
        };
        AgentRecord::from_report(report, 0.0).unwrap()
    }

    #[test]
    fn update_stores_and_replaces() {
        let mut registry = AgentRegistry::new();
        registry.update_agent(record("abe", Some("red"), 1.0), &TEAMS);
        registry.update_agent(record("abe", Some("red"), 5.0), &TEAMS);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("abe").unwrap().position().x, 5.0);
        assert_eq!(registry.report_count("abe"), 2);
    }

    #[test]
    fn known_team_joins_roster() {
        let mut registry = AgentRegistry::new();
        let binding = registry.update_agent(record("abe", Some("red"), 1.0), &TEAMS);

        assert_eq!(binding, TeamBinding::Member);
        assert_eq!(registry.roster()["red"], vec!["abe".to_string()]);
    }

    #[test]
    fn unknown_team_is_stored_but_not_rostered() {
        let mut registry = AgentRegistry::new();
        let binding = registry.update_agent(record("abe", Some("green"), 1.0), &TEAMS);

        assert_eq!(binding, TeamBinding::UnknownTeam("green".to_string()));
        assert!(registry.contains("abe"));
        assert!(registry.roster().is_empty());
    }

    #[test]
    fn missing_team_is_reported() {
        let mut registry = AgentRegistry::new();
        let binding = registry.update_agent(record("abe", None, 1.0), &TEAMS);
        assert_eq!(binding, TeamBinding::NoTeam);
    }

    #[test]
    fn team_change_moves_agent_between_rosters() {
        let mut registry = AgentRegistry::new();
        registry.update_agent(record("abe", Some("red"), 1.0), &TEAMS);
        registry.update_agent(record("abe", Some("blue"), 1.0), &TEAMS);

        let roster = registry.roster();
        assert!(!roster.contains_key("red"));
        assert_eq!(roster["blue"], vec!["abe".to_string()]);
    }

    #[test]
    fn iteration_is_name_ordered() {
        let mut registry = AgentRegistry::new();
        registry.update_agent(record("cal", Some("red"), 1.0), &TEAMS);
        registry.update_agent(record("abe", Some("red"), 1.0), &TEAMS);
        registry.update_agent(record("bob", Some("blue"), 1.0), &TEAMS);

        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["abe", "bob", "cal"]);
    }
}
