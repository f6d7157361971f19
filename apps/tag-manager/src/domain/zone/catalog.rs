use super::polygon::Polygon;
use crate::domain::agent::Position;
use serde::Serialize;

/// Index of a zone in the catalog (0 is `zone_one`)
pub type ZoneId = usize;

/// A team-owned home region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Zone {
    team: String,
    polygon: Polygon,
    color: String,
    post_var: Option<String>,
    #[serde(skip)]
    team_bound: bool,
}

impl Zone {
    pub fn new(team: impl Into<String>, color: impl Into<String>, post_var: Option<String>) -> Self {
        Self {
            team: team.into(),
            polygon: Polygon::default(),
            color: color.into(),
            post_var,
            team_bound: false,
        }
    }

    /// Team label; doubles as the zone label on displays
    pub fn team(&self) -> &str {
        &self.team
    }

    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    /// Extra variable the zone spec is published under, if any
    pub fn post_var(&self) -> Option<&str> {
        self.post_var.as_deref()
    }

    pub fn is_configured(&self) -> bool {
        !self.polygon.is_empty()
    }

    pub fn contains(&self, position: Position) -> bool {
        self.polygon.contains(position.x, position.y)
    }

    /// Display spec, e.g.
    /// `pts={0,-20:120,-20:120,-100:0,-100},label=red,edge_color=gray50,...`
    pub fn spec(&self) -> String {
        format!(
            "{},label={},edge_color=gray50,vertex_color=gray50,fill_color={},\
             vertex_size=1,edge_size=1,fill_transparency=0.1",
            self.polygon.pts_spec(),
            self.team,
            self.color
        )
    }
}

/// The set of home zones, one per team
///
/// Zones are bound to teams by configuration order: zone 0 belongs to the
/// first configured team, zone 1 to the second. Geometry never decides
/// ownership.
///
/// # Example
/// ```
/// use tag_manager::domain::zone::ZoneCatalog;
/// use tag_manager::domain::agent::Position;
///
/// let mut zones = ZoneCatalog::default();
/// zones
///     .configure_zone(0, "pts={0,0:120,0:120,-100:0,-100}".parse().unwrap())
///     .expect("zone 0 exists");
///
/// assert!(zones.contains(0, 10.0, -10.0));
/// assert!(zones.in_home_zone(Some("red"), Position::new(10.0, -10.0)));
/// assert!(!zones.in_home_zone(Some("blue"), Position::new(10.0, -10.0)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneCatalog {
    zones: Vec<Zone>,
}

impl Default for ZoneCatalog {
    /// Two unconfigured zones owned by "red" and "blue"
    fn default() -> Self {
        Self::new(vec![
            Zone::new("red", "pink", Some("UTM_ZONE_ONE".to_string())),
            Zone::new("blue", "light_blue", Some("UTM_ZONE_TWO".to_string())),
        ])
    }
}

impl ZoneCatalog {
    pub fn new(zones: Vec<Zone>) -> Self {
        Self { zones }
    }

    /// Installs the geometry of a zone, replacing any prior definition
    ///
    /// # Returns
    /// * `Ok(())` - Zone updated
    /// * `Err(String)` - Unknown zone id, or a polygon with no vertices
    pub fn configure_zone(&mut self, id: ZoneId, polygon: Polygon) -> Result<(), String> {
        if polygon.is_empty() {
            return Err(format!("Zone {} polygon has no vertices", id + 1));
        }
        let zone = self.zone_mut(id)?;
        zone.polygon = polygon;
        Ok(())
    }

    /// Binds a team name to a zone; a zone can be bound only once
    pub fn bind_team(&mut self, id: ZoneId, team: &str) -> Result<(), String> {
        let team = team.trim();
        if team.is_empty() {
            return Err(format!("Empty team name for zone {}", id + 1));
        }
        let zone = self.zone_mut(id)?;
        if zone.team_bound {
            return Err(format!("Zone {} is already bound to team {}", id + 1, zone.team));
        }
        zone.team = team.to_string();
        zone.team_bound = true;
        Ok(())
    }

    pub fn set_color(&mut self, id: ZoneId, color: &str) -> Result<(), String> {
        self.zone_mut(id)?.color = color.to_string();
        Ok(())
    }

    pub fn set_post_var(&mut self, id: ZoneId, var: &str) -> Result<(), String> {
        self.zone_mut(id)?.post_var = Some(var.to_string());
        Ok(())
    }

    /// Containment test for one zone; unknown ids contain nothing
    pub fn contains(&self, id: ZoneId, x: f64, y: f64) -> bool {
        self.zones
            .get(id)
            .map(|zone| zone.polygon.contains(x, y))
            .unwrap_or(false)
    }

    /// Zone owned by a team
    pub fn home_zone(&self, team: &str) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.team == team)
    }

    /// True when the position lies inside the zone owned by `team`
    pub fn in_home_zone(&self, team: Option<&str>, position: Position) -> bool {
        team.and_then(|team| self.home_zone(team))
            .map(|zone| zone.contains(position))
            .unwrap_or(false)
    }

    /// True when the position lies inside any zone
    pub fn on_field(&self, position: Position) -> bool {
        self.zones.iter().any(|zone| zone.contains(position))
    }

    pub fn teams(&self) -> Vec<&str> {
        self.zones.iter().map(|zone| zone.team.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    fn zone_mut(&mut self, id: ZoneId) -> Result<&mut Zone, String> {
        self.zones
            .get_mut(id)
            .ok_or_else(|| format!("Unknown zone {}", id + 1))
    }
}
