//! Settings read from the environment.
//!
//! Every loader takes a lookup function so tests can supply variables
//! without touching the process environment; `from_env` passes
//! `std::env::var`.

use std::path::PathBuf;

use seoquery_api::{Client, Credentials};

use crate::billing::{PlanTable, WebhookHandler};
use crate::error::SeoQueryError;

pub const DEFAULT_BASE_URL: &str = "https://api.dataforseo.com";
pub const DEFAULT_DB_PATH: &str = "seoquery.db";
pub const DEFAULT_USER: &str = "local";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{var}: {message}")]
    Invalid { var: &'static str, message: String },
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, key).ok_or(ConfigError::Missing(key))
}

/// Credentials and endpoint of the SEO data API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub credentials: Credentials,
    pub base_url: String,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    /// Reads `DATAFORSEO_LOGIN`, `DATAFORSEO_PASSWORD` and the optional
    /// `DATAFORSEO_BASE_URL`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let login = required(&lookup, "DATAFORSEO_LOGIN")?;
        let password = required(&lookup, "DATAFORSEO_PASSWORD")?;
        let base_url = non_empty(&lookup, "DATAFORSEO_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: "DATAFORSEO_BASE_URL",
                message: format!("'{}' is not an http(s) URL", base_url),
            });
        }
        Ok(Self {
            credentials: Credentials::new(&login, &password),
            base_url,
        })
    }

    pub fn build_client(&self) -> Result<Client, SeoQueryError> {
        Ok(Client::with_base_url(&self.base_url, self.credentials.clone())?)
    }
}

/// Webhook signing secret and the plan table location.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub secret: String,
    pub plans_path: PathBuf,
}

impl WebhookConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    /// Reads `STRIPE_WEBHOOK_SECRET` and `SEOQUERY_PLANS`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            secret: required(&lookup, "STRIPE_WEBHOOK_SECRET")?,
            plans_path: PathBuf::from(required(&lookup, "SEOQUERY_PLANS")?),
        })
    }

    /// Loads the plan table and builds the handler.
    pub fn handler(&self) -> Result<WebhookHandler, SeoQueryError> {
        let plans = PlanTable::load(&self.plans_path)?;
        Ok(WebhookHandler::new(&self.secret, plans))
    }
}

/// SQLite path from `SEOQUERY_DB`.
pub fn db_path() -> PathBuf {
    db_path_from(env_lookup)
}

pub fn db_path_from<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    PathBuf::from(non_empty(&lookup, "SEOQUERY_DB").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()))
}

/// User id that local persistence is keyed by, from `SEOQUERY_USER`.
pub fn user_id() -> String {
    user_id_from(env_lookup)
}

pub fn user_id_from<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(&lookup, "SEOQUERY_USER").unwrap_or_else(|| DEFAULT_USER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn api_config_defaults_base_url() {
        let cfg = ApiConfig::from_lookup(vars(&[
            ("DATAFORSEO_LOGIN", "me@example.com"),
            ("DATAFORSEO_PASSWORD", "secret"),
        ]))
        .unwrap();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.credentials.login, "me@example.com");
    }

    #[test]
    fn api_config_requires_credentials() {
        let err = ApiConfig::from_lookup(vars(&[("DATAFORSEO_LOGIN", "me")])).unwrap_err();
        assert_eq!(err.to_string(), "DATAFORSEO_PASSWORD is not set");

        let blank = ApiConfig::from_lookup(vars(&[
            ("DATAFORSEO_LOGIN", "  "),
            ("DATAFORSEO_PASSWORD", "x"),
        ]));
        assert!(matches!(blank, Err(ConfigError::Missing("DATAFORSEO_LOGIN"))));
    }

    #[test]
    fn api_config_rejects_bad_base_url() {
        let err = ApiConfig::from_lookup(vars(&[
            ("DATAFORSEO_LOGIN", "me"),
            ("DATAFORSEO_PASSWORD", "x"),
            ("DATAFORSEO_BASE_URL", "ftp://example.com"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "DATAFORSEO_BASE_URL", .. }));
    }

    #[test]
    fn webhook_config_requires_both() {
        assert!(WebhookConfig::from_lookup(vars(&[("STRIPE_WEBHOOK_SECRET", "whsec")])).is_err());
        let cfg = WebhookConfig::from_lookup(vars(&[
            ("STRIPE_WEBHOOK_SECRET", "whsec"),
            ("SEOQUERY_PLANS", "plans.toml"),
        ]))
        .unwrap();
        assert_eq!(cfg.plans_path, PathBuf::from("plans.toml"));
    }

    #[test]
    fn missing_plan_file_is_a_billing_config_error() {
        let cfg = WebhookConfig {
            secret: "whsec".into(),
            plans_path: PathBuf::from("/nonexistent/plans.toml"),
        };
        assert!(matches!(
            cfg.handler(),
            Err(SeoQueryError::Billing(crate::billing::BillingError::Config(_)))
        ));
    }

    #[test]
    fn local_defaults() {
        assert_eq!(db_path_from(vars(&[])), PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(user_id_from(vars(&[("SEOQUERY_USER", "team-a")])), "team-a");
        assert_eq!(user_id_from(vars(&[])), DEFAULT_USER);
    }
}
