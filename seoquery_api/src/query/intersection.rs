use serde_json::{json, Map, Value};

use super::common::{Query, QueryCommon};

/// Keyword gap between two domains.
///
/// With `intersections` set the API returns keywords both domains rank for;
/// unset, it returns keywords the first domain ranks for and the second
/// does not.
#[derive(Debug, Clone, Default)]
pub struct DomainIntersectionQuery {
    pub common: QueryCommon,
    pub target1: String,
    pub target2: String,
    pub intersections: bool,
}

impl Query for DomainIntersectionQuery {
    fn endpoint(&self) -> &'static str {
        "/v3/dataforseo_labs/google/domain_intersection/live"
    }
    fn task_fields(&self) -> Map<String, Value> {
        let mut task = Map::new();
        task.insert("target1".to_string(), json!(self.target1));
        task.insert("target2".to_string(), json!(self.target2));
        task.insert("intersections".to_string(), json!(self.intersections));
        task
    }
    fn common(&self) -> &QueryCommon {
        &self.common
    }
    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }
}

impl DomainIntersectionQuery {
    pub fn new(target1: &str, target2: &str) -> Self {
        Self {
            target1: target1.to_string(),
            target2: target2.to_string(),
            ..Default::default()
        }
    }
    pub fn with_intersections(mut self, intersections: bool) -> Self {
        self.intersections = intersections;
        self
    }
}
