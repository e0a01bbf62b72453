use serde::{Deserialize, Serialize};

/// Item of the backlinks endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacklinkItem {
    pub domain_from: String,
    pub url_from: String,
    pub domain_to: Option<String>,
    pub url_to: String,
    pub anchor: Option<String>,
    #[serde(default)]
    pub dofollow: bool,
    pub rank: Option<i64>,
    pub domain_from_rank: Option<i64>,
    pub page_from_title: Option<String>,
    pub first_seen: Option<String>,
    pub last_seen: Option<String>,
    #[serde(default)]
    pub is_lost: bool,
}
