use crate::domain::agent::Position;
use serde::{Deserialize, Serialize};

/// Why a tag request was turned down
///
/// The display form is the machine-readable reason carried in result posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    /// Requester is itself tagged
    SelfTagged,
    /// Requester tagged someone less than the minimum interval ago
    Frequency,
    /// Requester is outside its own team's zone
    Zone,
}

impl RejectReason {
    /// Human wording used for `$REASON` in no-tag posts
    pub fn notag_message(&self) -> &'static str {
        match self {
            RejectReason::SelfTagged => "Tagger is tagged",
            RejectReason::Frequency => "Tagger is fast",
            RejectReason::Zone => "Tagger is not home",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::SelfTagged => write!(f, "self-tagged"),
            RejectReason::Frequency => write!(f, "frequency"),
            RejectReason::Zone => write!(f, "zone"),
        }
    }
}

/// Human-crewed platforms get their own post templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentClass {
    Human,
    Robot,
}

impl AgentClass {
    /// Classifies a platform type against the configured human platform
    pub fn of(kind: &str, human_platform: &str) -> Self {
        if kind.eq_ignore_ascii_case(human_platform) {
            AgentClass::Human
        } else {
            AgentClass::Robot
        }
    }
}

/// A tag request waiting for the next cycle
///
/// The position is a snapshot taken when the request arrived; the request
/// is resolved against that snapshot even if the requester reports a new
/// position before the cycle runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagRequest {
    pub seq: u64,
    pub requester: String,
    pub team: Option<String>,
    pub position: Position,
    pub submitted_at: f64,
}

/// A potential target found by the candidate search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub name: String,
    pub kind: String,
    pub range: f64,
}

/// What the arbiter decided for one request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum TagOutcome {
    /// Failed one of the gates
    Rejected { reason: RejectReason },
    /// Passed the gates but nobody was tagged
    Accepted,
    /// Passed the gates and the nearest candidate was in range
    Succeeded {
        target: String,
        class: AgentClass,
        range: f64,
    },
}

impl TagOutcome {
    /// Value of the result field in `TAG_RESULT_<SRC>` posts
    pub fn result_field(&self) -> String {
        match self {
            TagOutcome::Rejected { reason } => format!("rejected={}", reason),
            TagOutcome::Accepted => "tagged=none".to_string(),
            TagOutcome::Succeeded { target, .. } => format!("tagged={}", target),
        }
    }

    pub fn passed_gates(&self) -> bool {
        !matches!(self, TagOutcome::Rejected { .. })
    }
}

/// A resolved request, with the ranges measured while resolving it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagResolution {
    pub request: TagRequest,
    pub outcome: TagOutcome,
    /// Candidates in ascending range order; empty when a gate failed
    pub candidates: Vec<Candidate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_reason_display() {
        assert_eq!(RejectReason::SelfTagged.to_string(), "self-tagged");
        assert_eq!(RejectReason::Frequency.to_string(), "frequency");
        assert_eq!(RejectReason::Zone.to_string(), "zone");
    }

    #[test]
    fn reject_reason_serializes_like_display() {
        let json = serde_json::to_string(&RejectReason::SelfTagged).unwrap();
        assert_eq!(json, "\"self-tagged\"");
    }

    #[test]
    fn classify_is_case_blind() {
        assert_eq!(AgentClass::of("MOKAI", "mokai"), AgentClass::Human);
        assert_eq!(AgentClass::of("kayak", "mokai"), AgentClass::Robot);
        assert_eq!(AgentClass::of("", "mokai"), AgentClass::Robot);
    }

    #[test]
    fn result_field_forms() {
        let rejected = TagOutcome::Rejected { reason: RejectReason::Zone };
        assert_eq!(rejected.result_field(), "rejected=zone");
        assert!(!rejected.passed_gates());

        assert_eq!(TagOutcome::Accepted.result_field(), "tagged=none");
        assert!(TagOutcome::Accepted.passed_gates());

        let hit = TagOutcome::Succeeded {
            target: "gus".to_string(),
            class: AgentClass::Robot,
            range: 3.0,
        };
        assert_eq!(hit.result_field(), "tagged=gus");
    }
}
