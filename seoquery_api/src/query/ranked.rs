use serde_json::{json, Map, Value};

use super::common::{Query, QueryCommon};

/// Keywords a domain currently ranks for.
#[derive(Debug, Clone, Default)]
pub struct RankedKeywordsQuery {
    pub common: QueryCommon,
    pub target: String,
}

impl Query for RankedKeywordsQuery {
    fn endpoint(&self) -> &'static str {
        "/v3/dataforseo_labs/google/ranked_keywords/live"
    }
    fn task_fields(&self) -> Map<String, Value> {
        let mut task = Map::new();
        task.insert("target".to_string(), json!(self.target));
        task
    }
    fn common(&self) -> &QueryCommon {
        &self.common
    }
    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }
}

impl RankedKeywordsQuery {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            ..Default::default()
        }
    }
}
