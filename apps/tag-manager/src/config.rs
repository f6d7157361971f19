// Configuration
//
// The tag manager config block (`key = value` lines) and the env-driven
// server settings.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::domain::tag::TagRules;
use crate::domain::zone::{Polygon, ZoneCatalog, ZoneId};
use crate::game::notifications::{PostTemplate, PostTemplates, TemplateCategory};

/// Platform types accepted for `human_platform`
const KNOWN_VEHICLE_TYPES: &[&str] = &[
    "auv", "uuv", "usv", "ship", "kayak", "mokai", "wamv", "heron", "glider", "longship",
    "buoy", "cray",
];

/// Problems found while reading the config block
///
/// Never fatal: the offending line is skipped and the prior value kept.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigWarning {
    #[error("Unhandled config line: {0}")]
    Unhandled(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Bad {key}: {reason}")]
    Rejected { key: String, reason: String },

    #[error("Unable to read config file {path}: {reason}")]
    Unreadable { path: String, reason: String },
}

/// Tag manager configuration
#[derive(Debug, Clone)]
pub struct TagConfig {
    pub rules: TagRules,
    /// Seconds between full re-announcements of on-field flags
    pub onfield_post_interval: f64,
    /// Seconds between no-tag posts for the same agent
    pub notag_gap: f64,
    pub zones: ZoneCatalog,
    pub human_platform: String,
    pub post_color: String,
    pub tag_circle: bool,
    pub tag_circle_range: f64,
    pub tag_circle_color: String,
    pub oob_circle_color: String,
    pub templates: PostTemplates,
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            rules: TagRules::default(),
            onfield_post_interval: 10.0,
            notag_gap: 5.0,
            zones: ZoneCatalog::default(),
            human_platform: "mokai".to_string(),
            post_color: "white".to_string(),
            tag_circle: true,
            tag_circle_range: 5.0,
            tag_circle_color: "green".to_string(),
            oob_circle_color: "yellow".to_string(),
            templates: PostTemplates::default(),
        }
    }
}

impl TagConfig {
    /// Parses a config block
    ///
    /// Lines are `param = value`; params are case-insensitive and `//`
    /// starts a comment. Every line that cannot be applied yields a
    /// warning and leaves the current value in place.
    ///
    /// # Example
    /// ```
    /// use tag_manager::config::TagConfig;
    ///
    /// let (config, warnings) = TagConfig::parse("tag_range = 30\nbogus = 1");
    /// assert_eq!(config.rules.tag_range, 30.0);
    /// assert_eq!(warnings.len(), 1);
    /// ```
    pub fn parse(text: &str) -> (Self, Vec<ConfigWarning>) {
        let mut config = Self::default();
        let mut warnings = Vec::new();

        for raw in text.lines() {
            let line = raw.split("//").next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }

            let Some((param, value)) = line.split_once('=') else {
                warnings.push(ConfigWarning::Unhandled(line.to_string()));
                continue;
            };

            let param = param.trim().to_lowercase();
            if let Err(warning) = config.apply(&param, value.trim()) {
                warnings.push(warning);
            }
        }

        (config, warnings)
    }

    /// Reads and parses a config file; an unreadable file yields defaults
    pub fn load(path: impl AsRef<Path>) -> (Self, Vec<ConfigWarning>) {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(e) => (
                Self::default(),
                vec![ConfigWarning::Unreadable {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }],
            ),
        }
    }

    fn apply(&mut self, param: &str, value: &str) -> Result<(), ConfigWarning> {
        let invalid = || ConfigWarning::InvalidValue {
            key: param.to_string(),
            value: value.to_string(),
        };
        let rejected = |reason: String| ConfigWarning::Rejected {
            key: param.to_string(),
            reason,
        };

        match param {
            "tag_range" => self.rules.tag_range = non_negative(value).ok_or_else(invalid)?,
            "tag_min_interval" => self.rules.min_interval = non_negative(value).ok_or_else(invalid)?,
            "tag_duration" => self.rules.duration = non_negative(value).ok_or_else(invalid)?,
            "notag_gap" => self.notag_gap = non_negative(value).ok_or_else(invalid)?,
            "onfield_post_interval" => {
                self.onfield_post_interval = non_negative(value).ok_or_else(invalid)?
            }
            "tag_circle_range" => self.tag_circle_range = non_negative(value).ok_or_else(invalid)?,
            "tag_circle" => self.tag_circle = boolean(value).ok_or_else(invalid)?,
            "post_color" => self.post_color = color(value).ok_or_else(invalid)?,
            "tag_circle_color" => self.tag_circle_color = color(value).ok_or_else(invalid)?,
            "oob_circle_color" => self.oob_circle_color = color(value).ok_or_else(invalid)?,
            "zone_one" | "zone_two" => {
                let polygon: Polygon = value.parse().map_err(rejected)?;
                self.zones
                    .configure_zone(zone_id(param), polygon)
                    .map_err(rejected)?;
            }
            "zone_one_color" | "zone_two_color" => {
                let color = color(value).ok_or_else(invalid)?;
                self.zones.set_color(zone_id(param), &color).map_err(rejected)?;
            }
            "zone_one_post_var" | "zone_two_post_var" => {
                if value.is_empty() || value.contains(char::is_whitespace) {
                    return Err(invalid());
                }
                self.zones.set_post_var(zone_id(param), value).map_err(rejected)?;
            }
            "team_one" | "team_two" => {
                self.zones.bind_team(zone_id(param), value).map_err(rejected)?;
            }
            "human_platform" => {
                let kind = value.to_lowercase();
                if !KNOWN_VEHICLE_TYPES.contains(&kind.as_str()) {
                    return Err(rejected(format!("unknown vehicle type {}", value)));
                }
                self.human_platform = kind;
            }
            _ => {
                let category = TemplateCategory::from_config_key(param)
                    .ok_or_else(|| ConfigWarning::Unhandled(format!("{} = {}", param, value)))?;
                let template: PostTemplate = value.parse().map_err(rejected)?;
                self.templates.add(category, template);
            }
        }

        Ok(())
    }
}

fn zone_id(param: &str) -> ZoneId {
    if param.starts_with("zone_one") || param == "team_one" {
        0
    } else {
        1
    }
}

fn non_negative(value: &str) -> Option<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

fn boolean(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" => Some(true),
        "false" | "no" => Some(false),
        _ => None,
    }
}

fn color(value: &str) -> Option<String> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':' || c == '.');
    valid.then(|| value.to_lowercase())
}

/// Process-level settings read from the environment
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub bind_addr: SocketAddr,
    pub tick_interval: Duration,
    pub config_path: Option<String>,
}

impl ServerSettings {
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("BIND_ADDR")
            .ok()
            .and_then(|addr| addr.parse().ok())
            .unwrap_or_else(|| {
                tracing::warn!("BIND_ADDR not set or invalid, using default");
                SocketAddr::from(([0, 0, 0, 0], 3000))
            });

        let tick_ms = std::env::var("TICK_INTERVAL_MS")
            .ok()
            .and_then(|ms| ms.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(250);

        let config_path = std::env::var("TAG_CONFIG").ok();
        if config_path.is_none() {
            tracing::warn!("TAG_CONFIG not set, running with default config");
        }

        Self {
            bind_addr,
            tick_interval: Duration::from_millis(tick_ms),
            config_path,
        }
    }
}
