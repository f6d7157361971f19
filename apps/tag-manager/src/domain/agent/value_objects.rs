use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Planar position in local field coordinates (meters)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean range to another position
    pub fn range_to(&self, other: Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Position report as delivered by the transport
///
/// Every field is optional on the wire; a report is only usable once it
/// carries a name and both coordinates. Validation happens when the report
/// is turned into an [`AgentRecord`](super::AgentRecord).
///
/// # Example
/// ```
/// use tag_manager::domain::agent::PositionReport;
///
/// let report: PositionReport = "NAME=abe,TYPE=kayak,X=10,Y=-4,HDG=90,GROUP=red"
///     .parse()
///     .expect("mail form always parses");
///
/// assert_eq!(report.name.as_deref(), Some("abe"));
/// assert_eq!(report.team.as_deref(), Some("red"));
/// assert_eq!(report.x, Some(10.0));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionReport {
    pub name: Option<String>,
    #[serde(alias = "group")]
    pub team: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub heading: Option<f64>,
    pub timestamp: Option<f64>,
}

impl FromStr for PositionReport {
    type Err = String;

    /// Parses the comma-separated node report mail form, e.g.
    /// `NAME=alpha,TYPE=KAYAK,UTC_TIME=1267294386.51,X=29.66,Y=3.9,HDG=119.06`.
    ///
    /// Unknown keys are ignored and unparseable numbers are left unset, so a
    /// report with a garbled `X` is caught later by validation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err("Empty node report".to_string());
        }

        let mut report = PositionReport::default();
        for field in s.split(',') {
            let Some((key, value)) = field.split_once('=') else {
                continue;
            };
            let value = value.trim();
            match key.trim().to_ascii_uppercase().as_str() {
                "NAME" => report.name = Some(value.to_string()),
                "GROUP" | "TEAM" => report.team = Some(value.to_string()),
                "TYPE" => report.kind = Some(value.to_string()),
                "X" => report.x = value.parse().ok(),
                "Y" => report.y = value.parse().ok(),
                "HDG" | "HEADING" => report.heading = value.parse().ok(),
                "UTC_TIME" | "TIME" => report.timestamp = value.parse().ok(),
                _ => {}
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_is_euclidean() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert_eq!(a.range_to(b), 5.0);
        assert_eq!(b.range_to(a), 5.0);
    }

    #[test]
    fn parse_full_node_report() {
        let report: PositionReport =
            "NAME=alpha,TYPE=KAYAK,UTC_TIME=1267294386.51,X=29.66,Y=3.9,SPD=2.0,HDG=119.06,GROUP=blue"
                .parse()
                .unwrap();

        assert_eq!(report.name.as_deref(), Some("alpha"));
        assert_eq!(report.kind.as_deref(), Some("KAYAK"));
        assert_eq!(report.team.as_deref(), Some("blue"));
        assert_eq!(report.x, Some(29.66));
        assert_eq!(report.y, Some(3.9));
        assert_eq!(report.heading, Some(119.06));
        assert_eq!(report.timestamp, Some(1267294386.51));
    }

    #[test]
    fn parse_is_case_insensitive_on_keys() {
        let report: PositionReport = "name=abe,x=1,y=2".parse().unwrap();
        assert_eq!(report.name.as_deref(), Some("abe"));
        assert_eq!(report.x, Some(1.0));
    }

    #[test]
    fn garbled_number_is_left_unset() {
        let report: PositionReport = "NAME=abe,X=ten,Y=2".parse().unwrap();
        assert_eq!(report.x, None);
        assert_eq!(report.y, Some(2.0));
    }

    #[test]
    fn empty_report_fails_to_parse() {
        assert!("".parse::<PositionReport>().is_err());
        assert!("   ".parse::<PositionReport>().is_err());
    }

    #[test]
    fn json_report_accepts_group_alias() {
        let report: PositionReport =
            serde_json::from_str(r#"{"name":"abe","group":"red","type":"kayak","x":1.0,"y":2.0}"#)
                .unwrap();
        assert_eq!(report.team.as_deref(), Some("red"));
        assert_eq!(report.kind.as_deref(), Some("kayak"));
    }
}
