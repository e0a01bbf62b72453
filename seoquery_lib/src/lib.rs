//! Library layer for seoquery: filter state, report schemas, query execution,
//! view rows, CSV export, persistence, and billing webhooks.
//!
//! Wraps the `seoquery_api` crate. Nothing here holds global state; the API
//! client and the database are constructed by the caller and passed in.

pub mod billing;
pub mod config;
pub mod db;
pub mod error;
pub mod executor;
pub mod export;
pub mod filter_state;
pub mod pagination;
pub mod rows;
pub mod schema;
pub mod session;
pub mod validation;

pub use seoquery_api;
pub use seoquery_api::types;
pub use seoquery_api::{BacklinkMode, Connective, OrderBy, SortDirection};

pub use billing::{
    BillingError, Plan, PlanTable, PlanUpdate, UserKey, WebhookEvent, WebhookHandler, WebhookOutcome,
};
pub use config::{ApiConfig, ConfigError, WebhookConfig};
pub use db::{Db, DbError, KeywordList, Snapshot, SnapshotSummary, User};
pub use error::SeoQueryError;
pub use executor::{Fetched, Locale, QueryExecutor};
pub use filter_state::{FilterState, PatternClause, Range};
pub use pagination::Pagination;
pub use rows::{BacklinkRow, GapRow, KeywordRow, RankedKeywordRow, ViewRow};
pub use schema::{FilterFields, Report};
pub use session::{FetchRequest, FilterSession, RequestGeneration, ResultsView, SessionState};
