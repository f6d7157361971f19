// Notification engine
//
// Outbound posts, configurable post templates and the find/replace
// expansion that turns a tag event into concrete posts.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::tag::{AgentClass, RejectReason};

/// Value carried by a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostValue {
    Number(f64),
    Text(String),
}

impl PostValue {
    /// Numbers where the text parses as one, text otherwise
    pub fn auto(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(number) if number.is_finite() => PostValue::Number(number),
            _ => PostValue::Text(raw.to_string()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PostValue::Text(text) => Some(text),
            PostValue::Number(_) => None,
        }
    }
}

impl fmt::Display for PostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostValue::Number(number) => write!(f, "{}", number),
            PostValue::Text(text) => write!(f, "{}", text),
        }
    }
}

/// One outbound key/value publication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub key: String,
    pub value: PostValue,
}

impl Post {
    pub fn text(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: PostValue::Text(value.into()),
        }
    }

    pub fn number(key: impl Into<String>, value: f64) -> Self {
        Self {
            key: key.into(),
            value: PostValue::Number(value),
        }
    }

    /// `true` / `false` text post
    pub fn flag(key: impl Into<String>, value: bool) -> Self {
        Self::text(key, value.to_string())
    }
}

/// A configured post with placeholders, e.g. `TAGGED_$UP_TARGET=true`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostTemplate {
    key: String,
    value: PostValue,
}

impl PostTemplate {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &PostValue {
        &self.value
    }

    /// Expands placeholders
    ///
    /// Numeric values are posted as-is; only text values are expanded.
    pub fn render(&self, vars: &TemplateVars) -> Post {
        let key = vars.apply_to_key(&self.key);
        let value = match &self.value {
            PostValue::Number(number) => PostValue::Number(*number),
            PostValue::Text(text) => PostValue::Text(vars.apply_to_value(text)),
        };
        Post { key, value }
    }
}

impl FromStr for PostTemplate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| format!("Post template '{}' has no '='", s))?;
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            return Err(format!("Post template '{}' needs both a key and a value", s));
        }
        Ok(Self {
            key: key.to_string(),
            value: PostValue::auto(value),
        })
    }
}

/// Which event a template list belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateCategory {
    RobotTag,
    HumanTag,
    RobotUntag,
    HumanUntag,
    NoTag,
}

impl TemplateCategory {
    pub fn from_config_key(key: &str) -> Option<Self> {
        match key {
            "robot_tag_post" => Some(TemplateCategory::RobotTag),
            "human_tag_post" => Some(TemplateCategory::HumanTag),
            "robot_untag_post" => Some(TemplateCategory::RobotUntag),
            "human_untag_post" => Some(TemplateCategory::HumanUntag),
            "notag_post" => Some(TemplateCategory::NoTag),
            _ => None,
        }
    }

    pub fn tag(class: AgentClass) -> Self {
        match class {
            AgentClass::Human => TemplateCategory::HumanTag,
            AgentClass::Robot => TemplateCategory::RobotTag,
        }
    }

    pub fn untag(class: AgentClass) -> Self {
        match class {
            AgentClass::Human => TemplateCategory::HumanUntag,
            AgentClass::Robot => TemplateCategory::RobotUntag,
        }
    }
}

/// Template lists per category, in configuration order
#[derive(Debug, Clone, Default)]
pub struct PostTemplates {
    lists: HashMap<TemplateCategory, Vec<PostTemplate>>,
}

impl PostTemplates {
    pub fn add(&mut self, category: TemplateCategory, template: PostTemplate) {
        self.lists.entry(category).or_default().push(template);
    }

    pub fn get(&self, category: TemplateCategory) -> &[PostTemplate] {
        self.lists.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn total(&self) -> usize {
        self.lists.values().map(Vec::len).sum()
    }
}

/// Ordered find/replace passes for one event
///
/// Name passes apply to both key and value; `$REASON` and `$TIME` only
/// to text values.
#[derive(Debug, Clone, Default)]
pub struct TemplateVars {
    names: Vec<(&'static str, String)>,
    reason: Option<String>,
    time: Option<f64>,
}

impl TemplateVars {
    pub fn tag(source: &str, target: &str, time: f64) -> Self {
        Self {
            names: vec![
                ("$SOURCE", source.to_string()),
                ("$TARGET", target.to_string()),
                ("$UP_SOURCE", source.to_uppercase()),
                ("$UP_TARGET", target.to_uppercase()),
            ],
            reason: None,
            time: Some(time),
        }
    }

    pub fn untag(target: &str, time: f64) -> Self {
        Self {
            names: vec![
                ("$TARGET", target.to_string()),
                ("$UP_TARGET", target.to_uppercase()),
            ],
            reason: None,
            time: Some(time),
        }
    }

    pub fn notag(source: &str, team: &str, reason: &str, time: f64) -> Self {
        Self {
            names: vec![
                ("$SOURCE", source.to_string()),
                ("$SRC_TEAM", team.to_string()),
                ("$UP_SOURCE", source.to_uppercase()),
                ("$UP_SRC_TEAM", team.to_uppercase()),
            ],
            reason: Some(reason.to_string()),
            time: Some(time),
        }
    }

    fn apply_to_key(&self, text: &str) -> String {
        self.names
            .iter()
            .fold(text.to_string(), |acc, (find, replace)| acc.replace(find, replace))
    }

    fn apply_to_value(&self, text: &str) -> String {
        let mut out = self.apply_to_key(text);
        if let Some(reason) = &self.reason {
            out = out.replace("$REASON", reason);
        }
        if let Some(time) = self.time {
            out = out.replace("$TIME", &format!("{:.2}", time));
        }
        out
    }
}

/// Expands templates for tag, untag and no-tag events
///
/// No-tag posts are throttled per source agent: after one goes out, further
/// ones for the same agent are swallowed for `notag_gap` seconds.
#[derive(Debug, Clone)]
pub struct NotificationEngine {
    templates: PostTemplates,
    notag_gap: f64,
    last_notag: HashMap<String, f64>,
}

impl NotificationEngine {
    pub fn new(templates: PostTemplates, notag_gap: f64) -> Self {
        Self {
            templates,
            notag_gap,
            last_notag: HashMap::new(),
        }
    }

    pub fn tag_posts(&self, class: AgentClass, source: &str, target: &str, now: f64) -> Vec<Post> {
        let vars = TemplateVars::tag(source, target, now);
        self.render(TemplateCategory::tag(class), &vars)
    }

    pub fn untag_posts(&self, class: AgentClass, target: &str, now: f64) -> Vec<Post> {
        let vars = TemplateVars::untag(target, now);
        self.render(TemplateCategory::untag(class), &vars)
    }

    /// No-tag posts for a rejected or missed request, or nothing if throttled
    pub fn notag_posts(&mut self, source: &str, team: &str, reason: &str, now: f64) -> Vec<Post> {
        if let Some(last) = self.last_notag.get(source) {
            if now - last < self.notag_gap {
                return Vec::new();
            }
        }
        self.last_notag.insert(source.to_string(), now);

        let vars = TemplateVars::notag(source, team, reason, now);
        self.render(TemplateCategory::NoTag, &vars)
    }

    /// Wording for `$REASON`: a gate failure or an empty search
    pub fn notag_reason(reason: Option<RejectReason>) -> &'static str {
        reason.map(|r| r.notag_message()).unwrap_or("Nobody in range")
    }

    fn render(&self, category: TemplateCategory, vars: &TemplateVars) -> Vec<Post> {
        self.templates
            .get(category)
            .iter()
            .map(|template| template.render(vars))
            .collect()
    }
}
