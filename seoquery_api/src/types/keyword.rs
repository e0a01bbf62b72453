use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Keyword metrics block, shared by the keyword ideas, ranked keywords and
/// domain intersection endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordData {
    pub keyword: String,
    pub location_code: Option<i64>,
    pub language_code: Option<String>,
    pub keyword_info: Option<KeywordInfo>,
    pub keyword_properties: Option<KeywordProperties>,
    pub search_intent_info: Option<SearchIntentInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordInfo {
    pub search_volume: Option<i64>,
    pub cpc: Option<f64>,
    pub competition: Option<f64>,
    pub competition_level: Option<String>,
    #[serde(default)]
    pub monthly_searches: Option<Vec<MonthlySearch>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlySearch {
    pub year: i32,
    pub month: u32,
    pub search_volume: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordProperties {
    pub keyword_difficulty: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchIntentInfo {
    pub main_intent: Option<SearchIntent>,
    #[serde(default)]
    pub foreign_intent: Option<Vec<SearchIntent>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchIntent {
    Informational,
    Navigational,
    Commercial,
    Transactional,
}

impl SearchIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchIntent::Informational => "informational",
            SearchIntent::Navigational => "navigational",
            SearchIntent::Commercial => "commercial",
            SearchIntent::Transactional => "transactional",
        }
    }
}

impl fmt::Display for SearchIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchIntent {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "informational" | "i" => Ok(SearchIntent::Informational),
            "navigational" | "n" => Ok(SearchIntent::Navigational),
            "commercial" | "c" => Ok(SearchIntent::Commercial),
            "transactional" | "t" => Ok(SearchIntent::Transactional),
            _ => Err(()),
        }
    }
}

impl KeywordData {
    pub fn search_volume(&self) -> Option<i64> {
        self.keyword_info.as_ref().and_then(|i| i.search_volume)
    }

    pub fn cpc(&self) -> Option<f64> {
        self.keyword_info.as_ref().and_then(|i| i.cpc)
    }

    pub fn competition(&self) -> Option<f64> {
        self.keyword_info.as_ref().and_then(|i| i.competition)
    }

    pub fn keyword_difficulty(&self) -> Option<i64> {
        self.keyword_properties
            .as_ref()
            .and_then(|p| p.keyword_difficulty)
    }

    pub fn main_intent(&self) -> Option<SearchIntent> {
        self.search_intent_info
            .as_ref()
            .and_then(|i| i.main_intent)
    }
}
