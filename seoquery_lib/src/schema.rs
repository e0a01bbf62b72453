//! Per-report field schemas: which filter categories a report supports, the
//! dotted API paths they compile to, and the sortable columns.

use std::fmt;
use std::str::FromStr;

use seoquery_api::{Field, OrderBy, SortDirection};

use crate::error::SeoQueryError;

/// The report pages the toolkit can query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    KeywordIdeas,
    RankedKeywords,
    KeywordGap,
    Backlinks,
}

impl Report {
    pub const ALL: [Report; 4] = [
        Report::KeywordIdeas,
        Report::RankedKeywords,
        Report::KeywordGap,
        Report::Backlinks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Report::KeywordIdeas => "keyword-ideas",
            Report::RankedKeywords => "ranked-keywords",
            Report::KeywordGap => "keyword-gap",
            Report::Backlinks => "backlinks",
        }
    }

    /// Filter fields available on this report.
    pub fn fields(&self) -> FilterFields {
        match self {
            Report::KeywordIdeas => FilterFields {
                volume: Some(Field::numeric("keyword_info.search_volume")),
                cpc: Some(Field::numeric("keyword_info.cpc")),
                difficulty: Some(Field::numeric("keyword_properties.keyword_difficulty")),
                intent: Some(Field::text("search_intent_info.main_intent")),
                keyword: Some(Field::text("keyword")),
                ..FilterFields::default()
            },
            Report::RankedKeywords => FilterFields {
                volume: Some(Field::numeric("keyword_data.keyword_info.search_volume")),
                cpc: Some(Field::numeric("keyword_data.keyword_info.cpc")),
                difficulty: Some(Field::numeric(
                    "keyword_data.keyword_properties.keyword_difficulty",
                )),
                rank: Some(Field::numeric("ranked_serp_element.serp_item.rank_group")),
                intent: Some(Field::text("keyword_data.search_intent_info.main_intent")),
                keyword: Some(Field::text("keyword_data.keyword")),
                url: Some(Field::text("ranked_serp_element.serp_item.relative_url")),
                ..FilterFields::default()
            },
            Report::KeywordGap => FilterFields {
                volume: Some(Field::numeric("keyword_data.keyword_info.search_volume")),
                cpc: Some(Field::numeric("keyword_data.keyword_info.cpc")),
                difficulty: Some(Field::numeric(
                    "keyword_data.keyword_properties.keyword_difficulty",
                )),
                rank: Some(Field::numeric("first_domain_serp_element.rank_group")),
                intent: Some(Field::text("keyword_data.search_intent_info.main_intent")),
                keyword: Some(Field::text("keyword_data.keyword")),
                url: Some(Field::text("first_domain_serp_element.relative_url")),
                ..FilterFields::default()
            },
            Report::Backlinks => FilterFields {
                rank: Some(Field::numeric("rank")),
                domain_rank: Some(Field::numeric("domain_from_rank")),
                dofollow: Some(Field::boolean("dofollow")),
                keyword: Some(Field::text("anchor")),
                url: Some(Field::text("url_from")),
                ..FilterFields::default()
            },
        }
    }

    /// Sortable columns: short name and dotted API path.
    pub fn sort_fields(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Report::KeywordIdeas => &[
                ("volume", "keyword_info.search_volume"),
                ("cpc", "keyword_info.cpc"),
                ("competition", "keyword_info.competition"),
                ("difficulty", "keyword_properties.keyword_difficulty"),
                ("keyword", "keyword"),
            ],
            Report::RankedKeywords => &[
                ("volume", "keyword_data.keyword_info.search_volume"),
                ("cpc", "keyword_data.keyword_info.cpc"),
                ("difficulty", "keyword_data.keyword_properties.keyword_difficulty"),
                ("position", "ranked_serp_element.serp_item.rank_group"),
                ("traffic", "ranked_serp_element.serp_item.etv"),
                ("keyword", "keyword_data.keyword"),
            ],
            Report::KeywordGap => &[
                ("volume", "keyword_data.keyword_info.search_volume"),
                ("cpc", "keyword_data.keyword_info.cpc"),
                ("difficulty", "keyword_data.keyword_properties.keyword_difficulty"),
                ("position", "first_domain_serp_element.rank_group"),
                ("keyword", "keyword_data.keyword"),
            ],
            Report::Backlinks => &[
                ("rank", "rank"),
                ("domain-rank", "domain_from_rank"),
                ("first-seen", "first_seen"),
            ],
        }
    }

    /// Sort applied when the user has not picked one.
    pub fn default_sort(&self) -> OrderBy {
        match self {
            Report::KeywordIdeas => OrderBy::new("volume", SortDirection::Desc),
            Report::RankedKeywords => OrderBy::new("volume", SortDirection::Desc),
            Report::KeywordGap => OrderBy::new("volume", SortDirection::Desc),
            Report::Backlinks => OrderBy::new("rank", SortDirection::Desc),
        }
    }

    /// Maps a sort rule on a short column name to the dotted API path.
    pub fn resolve_sort(&self, sort: &OrderBy) -> Result<OrderBy, SeoQueryError> {
        let name = sort.field.trim().to_ascii_lowercase();
        self.sort_fields()
            .iter()
            .find(|(alias, path)| *alias == name || *path == name)
            .map(|(_, path)| OrderBy::new(path, sort.direction))
            .ok_or_else(|| {
                let valid: Vec<&str> = self.sort_fields().iter().map(|(a, _)| *a).collect();
                SeoQueryError::InvalidInput(format!(
                    "cannot sort {} by '{}'. Valid columns: {}",
                    self,
                    sort.field,
                    valid.join(", ")
                ))
            })
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Report {
    type Err = SeoQueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Report::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| SeoQueryError::InvalidInput(format!("unknown report '{}'", s)))
    }
}

/// Dotted API paths for each filter category. `None` means the report does
/// not support that category.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterFields {
    pub volume: Option<Field>,
    pub cpc: Option<Field>,
    pub difficulty: Option<Field>,
    /// SERP position for keyword reports, page rank for backlinks.
    pub rank: Option<Field>,
    pub domain_rank: Option<Field>,
    pub intent: Option<Field>,
    pub dofollow: Option<Field>,
    /// Free-text match on the keyword (anchor text for backlinks).
    pub keyword: Option<Field>,
    /// Free-text match on the ranking or linking URL.
    pub url: Option<Field>,
}
