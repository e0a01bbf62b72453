use serde::{Deserialize, Serialize};

use super::KeywordData;

/// A SERP result belonging to the analysed domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerpItem {
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub rank_group: Option<i64>,
    pub rank_absolute: Option<i64>,
    pub domain: Option<String>,
    pub url: Option<String>,
    pub relative_url: Option<String>,
    pub title: Option<String>,
    pub etv: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedSerpElement {
    pub serp_item: SerpItem,
}

/// Item of the ranked keywords endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedKeywordItem {
    pub keyword_data: KeywordData,
    pub ranked_serp_element: RankedSerpElement,
}

/// Item of the domain intersection endpoint. Either SERP element may be
/// missing when only one domain ranks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainIntersectionItem {
    pub keyword_data: KeywordData,
    pub first_domain_serp_element: Option<SerpItem>,
    pub second_domain_serp_element: Option<SerpItem>,
}
