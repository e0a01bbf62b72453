//! Shared query infrastructure: the [`Query`] trait, [`QueryCommon`] fields, and sorting.

use std::fmt;
use std::str::FromStr;

use serde_json::{json, Map, Value};

use crate::{filter::FilterExpr, Error};

/// Items requested per page. Every report uses the same fixed page size.
pub const PAGE_SIZE: u32 = 100;

/// Highest page a query can ask for. Larger pages are clamped.
pub const MAX_PAGE: u32 = 10_000;

/// Trait implemented by all report queries. Provides the JSON task body and
/// shared builder methods for pagination, locale, filters, and sorting.
pub trait Query {
    /// Path of the live endpoint, e.g. `/v3/dataforseo_labs/google/keyword_ideas/live`.
    fn endpoint(&self) -> &'static str;

    /// Report-specific task fields (targets, keywords, modes).
    fn task_fields(&self) -> Map<String, Value>;

    /// Returns a reference to the common query fields.
    fn common(&self) -> &QueryCommon;

    /// Returns a mutable reference to the common query fields.
    fn get_common(&mut self) -> &mut QueryCommon;

    /// Whether the endpoint takes `location_code`/`language_code`.
    fn uses_locale(&self) -> bool {
        true
    }

    /// Builds the request body: a JSON array holding one task object.
    fn to_body(&self) -> Result<Value, Error> {
        let mut task = self.task_fields();
        self.common().add_to_task(&mut task, self.uses_locale())?;
        Ok(Value::Array(vec![Value::Object(task)]))
    }

    /// Sets the page number (1-indexed), clamped to `1..=MAX_PAGE`.
    fn with_page(mut self, page: u32) -> Self
    where
        Self: Sized,
    {
        self.get_common().page = page.clamp(1, MAX_PAGE);
        self
    }

    /// Sets the location code (e.g. 2840 for the United States).
    fn with_location_code(mut self, location_code: u32) -> Self
    where
        Self: Sized,
    {
        self.get_common().location_code = location_code;
        self
    }

    /// Sets the language code (e.g. `en`).
    fn with_language_code(mut self, language_code: &str) -> Self
    where
        Self: Sized,
    {
        self.get_common().language_code = language_code.to_string();
        self
    }

    /// Sets the filter tree. An empty tree sends no `filters` key.
    fn with_filters(mut self, filters: FilterExpr) -> Self
    where
        Self: Sized,
    {
        self.get_common().filters = Some(filters);
        self
    }

    /// Appends a sort rule. Rules apply in the order they were added.
    fn with_order_by(mut self, order_by: OrderBy) -> Self
    where
        Self: Sized,
    {
        self.get_common().order_by.push(order_by);
        self
    }
}

/// Sort order for API results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    /// This is the default.
    #[default]
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        })
    }
}

impl FromStr for SortDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(()),
        }
    }
}

/// One sort rule, sent as `"field,direction"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn new(field: &str, direction: SortDirection) -> Self {
        Self {
            field: field.to_string(),
            direction,
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.field, self.direction)
    }
}

impl FromStr for OrderBy {
    type Err = ();

    /// Parses `field,direction`; a bare `field` sorts descending.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.split_once(',') {
            Some((field, dir)) => (field.trim(), dir.parse()?),
            None => (s.trim(), SortDirection::Desc),
        };
        if field.is_empty() {
            return Err(());
        }
        Ok(OrderBy::new(field, direction))
    }
}

/// Fields shared by all query types: pagination, locale, filters, and sorting.
#[derive(Debug, Clone)]
pub struct QueryCommon {
    /// Page number (1-indexed). Defaults to 1.
    pub page: u32,
    /// Defaults to 2840 (United States).
    pub location_code: u32,
    /// Defaults to `en`.
    pub language_code: String,
    pub filters: Option<FilterExpr>,
    pub order_by: Vec<OrderBy>,
}

impl Default for QueryCommon {
    fn default() -> QueryCommon {
        QueryCommon {
            page: 1,
            location_code: 2840,
            language_code: "en".to_string(),
            filters: None,
            order_by: Vec::new(),
        }
    }
}

impl QueryCommon {
    /// Number of items skipped before this page.
    pub fn offset(&self) -> u32 {
        (self.page.clamp(1, MAX_PAGE) - 1) * PAGE_SIZE
    }

    /// Writes the common pagination, locale, filter, and sort fields into a task.
    pub fn add_to_task(&self, task: &mut Map<String, Value>, with_locale: bool) -> Result<(), Error> {
        if with_locale {
            task.insert("location_code".to_string(), json!(self.location_code));
            task.insert("language_code".to_string(), json!(self.language_code));
        }
        if let Some(filters) = &self.filters {
            if let Some(compiled) = filters.compile()? {
                task.insert("filters".to_string(), compiled);
            }
        }
        if !self.order_by.is_empty() {
            let rules: Vec<String> = self.order_by.iter().map(|o| o.to_string()).collect();
            task.insert("order_by".to_string(), json!(rules));
        }
        task.insert("limit".to_string(), json!(PAGE_SIZE));
        task.insert("offset".to_string(), json!(self.offset()));
        Ok(())
    }
}
