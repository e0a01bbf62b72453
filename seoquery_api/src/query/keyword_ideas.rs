use serde_json::{json, Map, Value};

use super::common::{Query, QueryCommon};

/// Keyword research: ideas related to one or more seed keywords.
#[derive(Debug, Clone, Default)]
pub struct KeywordIdeasQuery {
    pub common: QueryCommon,
    pub keywords: Vec<String>,
}

impl Query for KeywordIdeasQuery {
    fn endpoint(&self) -> &'static str {
        "/v3/dataforseo_labs/google/keyword_ideas/live"
    }
    fn task_fields(&self) -> Map<String, Value> {
        let mut task = Map::new();
        task.insert("keywords".to_string(), json!(self.keywords));
        task
    }
    fn common(&self) -> &QueryCommon {
        &self.common
    }
    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }
}

impl KeywordIdeasQuery {
    pub fn with_keyword(mut self, keyword: &str) -> Self {
        self.keywords.push(keyword.to_string());
        self
    }
    pub fn with_keywords(mut self, keywords: &[String]) -> Self {
        self.keywords.extend_from_slice(keywords);
        self
    }
}
