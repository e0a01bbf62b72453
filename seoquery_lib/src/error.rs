//! Error types for the library layer.

use std::fmt;

use crate::billing::BillingError;
use crate::config::ConfigError;
use crate::db::DbError;

/// Errors produced by the library layer, wrapping upstream API errors
/// and adding persistence, billing, export, and input validation failures.
#[derive(Debug)]
pub enum SeoQueryError {
    /// An error from the underlying API client.
    Api(seoquery_api::Error),
    /// A database operation failed.
    Db(DbError),
    /// A webhook could not be verified or processed.
    Billing(BillingError),
    /// Configuration is missing or malformed.
    Config(ConfigError),
    /// JSON serialization or deserialization failed.
    Serialization(serde_json::Error),
    /// CSV encoding failed.
    Csv(csv::Error),
    /// User-provided input failed validation.
    InvalidInput(String),
}

impl fmt::Display for SeoQueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(e) => write!(f, "API error: {}", e),
            Self::Db(e) => write!(f, "Database error: {}", e),
            Self::Billing(e) => write!(f, "Billing error: {}", e),
            Self::Config(e) => write!(f, "Configuration error: {}", e),
            Self::Serialization(e) => write!(f, "Serialization error: {}", e),
            Self::Csv(e) => write!(f, "CSV error: {}", e),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for SeoQueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(e) => Some(e),
            Self::Db(e) => Some(e),
            Self::Billing(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Serialization(e) => Some(e),
            Self::Csv(e) => Some(e),
            Self::InvalidInput(_) => None,
        }
    }
}

impl From<seoquery_api::Error> for SeoQueryError {
    fn from(e: seoquery_api::Error) -> Self {
        Self::Api(e)
    }
}

impl From<DbError> for SeoQueryError {
    fn from(e: DbError) -> Self {
        Self::Db(e)
    }
}

impl From<BillingError> for SeoQueryError {
    fn from(e: BillingError) -> Self {
        Self::Billing(e)
    }
}

impl From<ConfigError> for SeoQueryError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<serde_json::Error> for SeoQueryError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e)
    }
}

impl From<csv::Error> for SeoQueryError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}
