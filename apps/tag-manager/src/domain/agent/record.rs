use super::value_objects::{Position, PositionReport};
use serde::Serialize;

/// Latest known state of a tracked agent
///
/// A record is replaced wholesale by every valid report for the same name;
/// no history is kept.
///
/// # Invariants
/// - Name is never empty
/// - Position coordinates are always finite
/// - Kind is stored lowercased so platform comparisons are case-blind
///
/// # Example
/// ```
/// use tag_manager::domain::agent::{AgentRecord, PositionReport};
///
/// let report: PositionReport = "NAME=abe,TYPE=MOKAI,X=1,Y=2,GROUP=red".parse().unwrap();
/// let record = AgentRecord::from_report(report, 100.0).expect("valid report");
///
/// assert_eq!(record.name(), "abe");
/// assert_eq!(record.kind(), "mokai");
/// assert_eq!(record.updated_at(), 100.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentRecord {
    name: String,
    team: Option<String>,
    kind: String,
    position: Position,
    heading: f64,
    updated_at: f64,
}

impl AgentRecord {
    /// Validates a position report and builds the record it describes
    ///
    /// # Arguments
    /// * `report` - The inbound report
    /// * `received_at` - Cycle time, used when the report carries no timestamp
    ///
    /// # Returns
    /// * `Ok(AgentRecord)` - If the report has a name and a finite position
    /// * `Err(String)` - Otherwise; the caller drops the report
    pub fn from_report(report: PositionReport, received_at: f64) -> Result<Self, String> {
        let name = report
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| "Position report has no name".to_string())?;

        let position = match (report.x, report.y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Position::new(x, y),
            _ => return Err(format!("Position report for {} has no valid position", name)),
        };

        let team = report
            .team
            .map(|team| team.trim().to_string())
            .filter(|team| !team.is_empty());

        Ok(Self {
            name,
            team,
            kind: report.kind.unwrap_or_default().trim().to_lowercase(),
            position,
            heading: report.heading.filter(|h| h.is_finite()).unwrap_or(0.0),
            updated_at: report.timestamp.unwrap_or(received_at),
        })
    }

    // ===== Getters =====

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Team named in the most recent report, if any
    pub fn team(&self) -> Option<&str> {
        self.team.as_deref()
    }

    /// Platform type, lowercased (e.g. "kayak", "mokai")
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn updated_at(&self) -> f64 {
        self.updated_at
    }
}
