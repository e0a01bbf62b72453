use std::fmt;
use std::str::FromStr;

use serde_json::{json, Map, Value};

use super::common::{Query, QueryCommon};

/// How the backlinks endpoint groups results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BacklinkMode {
    #[default]
    AsIs,
    OnePerDomain,
    OnePerAnchor,
}

impl fmt::Display for BacklinkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BacklinkMode::AsIs => "as_is",
            BacklinkMode::OnePerDomain => "one_per_domain",
            BacklinkMode::OnePerAnchor => "one_per_anchor",
        })
    }
}

impl FromStr for BacklinkMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "as_is" => Ok(BacklinkMode::AsIs),
            "one_per_domain" => Ok(BacklinkMode::OnePerDomain),
            "one_per_anchor" => Ok(BacklinkMode::OnePerAnchor),
            _ => Err(()),
        }
    }
}

/// Backlinks pointing at a domain.
#[derive(Debug, Clone, Default)]
pub struct BacklinksQuery {
    pub common: QueryCommon,
    pub target: String,
    pub mode: BacklinkMode,
}

impl Query for BacklinksQuery {
    fn endpoint(&self) -> &'static str {
        "/v3/backlinks/backlinks/live"
    }
    fn task_fields(&self) -> Map<String, Value> {
        let mut task = Map::new();
        task.insert("target".to_string(), json!(self.target));
        task.insert("mode".to_string(), json!(self.mode.to_string()));
        task
    }
    fn common(&self) -> &QueryCommon {
        &self.common
    }
    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }
    fn uses_locale(&self) -> bool {
        false
    }
}

impl BacklinksQuery {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            ..Default::default()
        }
    }
    pub fn with_mode(mut self, mode: BacklinkMode) -> Self {
        self.mode = mode;
        self
    }
}
