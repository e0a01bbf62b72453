//! Display-ready view rows, one type per report.
//!
//! Rows are flat projections of API items: nested metric blocks are
//! unwrapped, missing values stay `None`, and `cells` renders them as the
//! strings shown in tables and CSV exports.

use seoquery_api::types::{BacklinkItem, DomainIntersectionItem, KeywordData, RankedKeywordItem};
use serde::{Deserialize, Serialize};

/// A row with a fixed set of named columns.
pub trait ViewRow {
    /// Column headers, in display order.
    fn headers() -> &'static [&'static str];

    /// Cell values, one per header.
    fn cells(&self) -> Vec<String>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRow {
    pub keyword: String,
    pub search_volume: Option<i64>,
    pub cpc: Option<f64>,
    pub competition: Option<f64>,
    pub difficulty: Option<i64>,
    pub intent: Option<String>,
}

impl From<&KeywordData> for KeywordRow {
    fn from(k: &KeywordData) -> Self {
        Self {
            keyword: k.keyword.clone(),
            search_volume: k.search_volume(),
            cpc: k.cpc(),
            competition: k.competition(),
            difficulty: k.keyword_difficulty(),
            intent: k.main_intent().map(|i| i.to_string()),
        }
    }
}

impl ViewRow for KeywordRow {
    fn headers() -> &'static [&'static str] {
        &["Keyword", "Volume", "CPC", "Competition", "Difficulty", "Intent"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.keyword.clone(),
            int_cell(self.search_volume),
            money_cell(self.cpc),
            ratio_cell(self.competition),
            int_cell(self.difficulty),
            self.intent.clone().unwrap_or_default(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedKeywordRow {
    pub keyword: String,
    pub position: Option<i64>,
    pub search_volume: Option<i64>,
    pub cpc: Option<f64>,
    pub difficulty: Option<i64>,
    pub traffic: Option<f64>,
    pub url: Option<String>,
}

impl From<&RankedKeywordItem> for RankedKeywordRow {
    fn from(item: &RankedKeywordItem) -> Self {
        let k = &item.keyword_data;
        let serp = &item.ranked_serp_element.serp_item;
        Self {
            keyword: k.keyword.clone(),
            position: serp.rank_group,
            search_volume: k.search_volume(),
            cpc: k.cpc(),
            difficulty: k.keyword_difficulty(),
            traffic: serp.etv,
            url: serp.url.clone(),
        }
    }
}

impl ViewRow for RankedKeywordRow {
    fn headers() -> &'static [&'static str] {
        &["Keyword", "Position", "Volume", "CPC", "Difficulty", "Traffic", "URL"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.keyword.clone(),
            int_cell(self.position),
            int_cell(self.search_volume),
            money_cell(self.cpc),
            int_cell(self.difficulty),
            self.traffic.map(|t| format!("{:.0}", t)).unwrap_or_default(),
            self.url.clone().unwrap_or_default(),
        ]
    }
}

/// Keyword gap row: metrics plus the position of each domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapRow {
    pub keyword: String,
    pub search_volume: Option<i64>,
    pub cpc: Option<f64>,
    pub difficulty: Option<i64>,
    pub intent: Option<String>,
    pub first_position: Option<i64>,
    pub first_url: Option<String>,
    pub second_position: Option<i64>,
    pub second_url: Option<String>,
}

impl From<&DomainIntersectionItem> for GapRow {
    fn from(item: &DomainIntersectionItem) -> Self {
        let k = &item.keyword_data;
        let first = item.first_domain_serp_element.as_ref();
        let second = item.second_domain_serp_element.as_ref();
        Self {
            keyword: k.keyword.clone(),
            search_volume: k.search_volume(),
            cpc: k.cpc(),
            difficulty: k.keyword_difficulty(),
            intent: k.main_intent().map(|i| i.to_string()),
            first_position: first.and_then(|s| s.rank_group),
            first_url: first.and_then(|s| s.url.clone()),
            second_position: second.and_then(|s| s.rank_group),
            second_url: second.and_then(|s| s.url.clone()),
        }
    }
}

impl ViewRow for GapRow {
    fn headers() -> &'static [&'static str] {
        &[
            "Keyword",
            "Volume",
            "CPC",
            "Difficulty",
            "Intent",
            "Position 1",
            "URL 1",
            "Position 2",
            "URL 2",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.keyword.clone(),
            int_cell(self.search_volume),
            money_cell(self.cpc),
            int_cell(self.difficulty),
            self.intent.clone().unwrap_or_default(),
            int_cell(self.first_position),
            self.first_url.clone().unwrap_or_default(),
            int_cell(self.second_position),
            self.second_url.clone().unwrap_or_default(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacklinkRow {
    pub url_from: String,
    pub url_to: String,
    pub anchor: Option<String>,
    pub dofollow: bool,
    pub rank: Option<i64>,
    pub domain_from_rank: Option<i64>,
    pub first_seen: Option<String>,
}

impl From<&BacklinkItem> for BacklinkRow {
    fn from(item: &BacklinkItem) -> Self {
        Self {
            url_from: item.url_from.clone(),
            url_to: item.url_to.clone(),
            anchor: item.anchor.clone(),
            dofollow: item.dofollow,
            rank: item.rank,
            domain_from_rank: item.domain_from_rank,
            // "2021-03-02 10:21:45 +00:00" -> "2021-03-02"
            first_seen: item
                .first_seen
                .as_ref()
                .map(|s| s.split_whitespace().next().unwrap_or(s).to_string()),
        }
    }
}

impl ViewRow for BacklinkRow {
    fn headers() -> &'static [&'static str] {
        &["Source", "Target", "Anchor", "Follow", "Rank", "Domain Rank", "First Seen"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.url_from.clone(),
            self.url_to.clone(),
            self.anchor.clone().unwrap_or_default(),
            if self.dofollow { "dofollow" } else { "nofollow" }.to_string(),
            int_cell(self.rank),
            int_cell(self.domain_from_rank),
            self.first_seen.clone().unwrap_or_default(),
        ]
    }
}

fn int_cell(v: Option<i64>) -> String {
    v.map(|n| n.to_string()).unwrap_or_default()
}

fn money_cell(v: Option<f64>) -> String {
    v.map(|n| format!("{:.2}", n)).unwrap_or_default()
}

fn ratio_cell(v: Option<f64>) -> String {
    v.map(|n| format!("{:.2}", n)).unwrap_or_default()
}
