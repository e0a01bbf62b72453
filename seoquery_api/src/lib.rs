mod client;
mod errors;
pub mod filter;
mod query;
pub mod types;
pub use self::client::{extract_error_message, Client, Credentials};
pub use self::errors::Error;
pub use self::filter::{
    Connective, Field, FieldKind, FilterClause, FilterExpr, FilterOperator, FilterValue,
};
pub use self::query::{
    BacklinkMode, BacklinksQuery, DomainIntersectionQuery, KeywordIdeasQuery, OrderBy, Query,
    QueryCommon, RankedKeywordsQuery, SortDirection, MAX_PAGE, PAGE_SIZE,
};
