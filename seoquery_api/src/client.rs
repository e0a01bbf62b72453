//! HTTP client for the SEO data API.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::{
    query::{BacklinksQuery, DomainIntersectionQuery, KeywordIdeasQuery, Query, RankedKeywordsQuery},
    types::{
        null_as_empty, ApiResponse, BacklinkItem, DomainIntersectionItem, KeywordData, Page,
        RankedKeywordItem, SUCCESS_STATUS,
    },
    Error,
};

const DEFAULT_BASE_URL: &str = "https://api.dataforseo.com";

/// Request timeout for API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP Basic credentials attached to every request.
#[derive(Clone)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl Credentials {
    pub fn new(login: &str, password: &str) -> Self {
        Self {
            login: login.to_string(),
            password: password.to_string(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"***")
            .finish()
    }
}

/// HTTP client for the SEO data API.
///
/// Holds one `reqwest::Client` for its whole lifetime. Every call sends a
/// single page request and never retries; failures come back as one
/// human-readable [`Error`].
pub struct Client {
    http: reqwest::Client,
    base_api_url: String,
    credentials: Credentials,
}

impl Client {
    /// Creates a new client pointing at the production API.
    pub fn new(credentials: Credentials) -> Result<Self, Error> {
        Self::with_base_url(DEFAULT_BASE_URL, credentials)
    }

    /// Creates a new client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str, credentials: Credentials) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::Transport(e.to_string())
            })?;
        Ok(Self::with_http_client(http, base_url, credentials))
    }

    /// Creates a client around an existing `reqwest::Client`.
    pub fn with_http_client(http: reqwest::Client, base_url: &str, credentials: Credentials) -> Self {
        Self {
            http,
            base_api_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn get_url(&self, path: &str) -> Result<Url, Error> {
        Url::parse(format!("{}{}", &self.base_api_url, path).as_str()).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::Transport(format!("invalid URL: {}", e))
        })
    }

    async fn post<T, Q>(&self, query: &Q) -> Result<Page<T>, Error>
    where
        T: DeserializeOwned,
        Q: Query,
    {
        let url = self.get_url(query.endpoint())?;
        let body = query.to_body()?;
        let offset = query.common().offset();
        tracing::debug!("POST {} offset={}", query.endpoint(), offset);

        let resp = self
            .http
            .post(url)
            .basic_auth(&self.credentials.login, Some(&self.credentials.password))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request: {}", e);
                Error::Transport(e.to_string())
            })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::Transport(e.to_string())
        })?;

        if !status.is_success() {
            tracing::error!(
                "Request failed with status {}: {}",
                status,
                truncate_body(&text)
            );
            let message = extract_error_message(&text)
                .unwrap_or_else(|| format!("Request failed with status {}", status));
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        let parsed = serde_json::from_str::<ApiResponse<T>>(&text).map_err(|e| {
            tracing::error!(
                "Failed to parse response: {} | body: {}",
                e,
                truncate_body(&text)
            );
            Error::Decode(e.to_string())
        })?;

        into_page(parsed, offset)
    }

    /// Fetches keyword ideas for the query's seed keywords.
    pub async fn keyword_ideas(&self, query: &KeywordIdeasQuery) -> Result<Page<KeywordData>, Error> {
        self.post::<KeywordData, KeywordIdeasQuery>(query).await
    }

    /// Fetches keywords the target domain ranks for.
    pub async fn ranked_keywords(
        &self,
        query: &RankedKeywordsQuery,
    ) -> Result<Page<RankedKeywordItem>, Error> {
        self.post::<RankedKeywordItem, RankedKeywordsQuery>(query)
            .await
    }

    /// Fetches the keyword overlap or gap between two domains.
    pub async fn domain_intersection(
        &self,
        query: &DomainIntersectionQuery,
    ) -> Result<Page<DomainIntersectionItem>, Error> {
        self.post::<DomainIntersectionItem, DomainIntersectionQuery>(query)
            .await
    }

    /// Fetches backlinks pointing at the target.
    pub async fn backlinks(&self, query: &BacklinksQuery) -> Result<Page<BacklinkItem>, Error> {
        self.post::<BacklinkItem, BacklinksQuery>(query).await
    }
}

fn into_page<T>(resp: ApiResponse<T>, offset: u32) -> Result<Page<T>, Error> {
    if resp.status_code != SUCCESS_STATUS {
        let message = resp
            .tasks
            .iter()
            .find(|t| t.status_code != SUCCESS_STATUS && !t.status_message.is_empty())
            .map(|t| t.status_message.clone())
            .unwrap_or(resp.status_message);
        return Err(Error::Api {
            status_code: resp.status_code,
            message,
        });
    }

    let Some(task) = resp.tasks.into_iter().next() else {
        return Ok(Page::empty(offset));
    };
    if task.status_code != SUCCESS_STATUS {
        return Err(Error::Api {
            status_code: task.status_code,
            message: task.status_message,
        });
    }

    let Some(result) = task.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Page::empty(offset));
    };
    Ok(Page {
        total_count: result.total_count,
        offset,
        items: result.items.unwrap_or_default(),
    })
}

#[derive(Deserialize)]
struct StatusEnvelope {
    status_code: Option<i64>,
    status_message: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    tasks: Vec<TaskStatus>,
}

#[derive(Deserialize)]
struct TaskStatus {
    status_code: Option<i64>,
    status_message: Option<String>,
}

/// Picks the most specific error message out of a response body: the first
/// failed task's message, then the envelope's message. Returns `None` when
/// the body is not an envelope or carries no failure message.
pub fn extract_error_message(body: &str) -> Option<String> {
    let envelope: StatusEnvelope = serde_json::from_str(body).ok()?;
    let failed = |code: Option<i64>| code.map(|c| c != SUCCESS_STATUS).unwrap_or(true);

    envelope
        .tasks
        .into_iter()
        .filter(|t| failed(t.status_code))
        .find_map(|t| t.status_message.filter(|m| !m.is_empty()))
        .or_else(|| {
            envelope
                .status_message
                .filter(|m| !m.is_empty() && failed(envelope.status_code))
        })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_message_wins_over_envelope_message() {
        let body = r#"{"status_code":40000,"status_message":"Bad Request.",
            "tasks":[{"status_code":40501,"status_message":"Invalid Field: 'filters'."}]}"#;
        assert_eq!(
            extract_error_message(body).as_deref(),
            Some("Invalid Field: 'filters'.")
        );
    }

    #[test]
    fn envelope_message_used_without_failed_task() {
        let body = r#"{"status_code":40100,"status_message":"You are not authorized.","tasks":[]}"#;
        assert_eq!(
            extract_error_message(body).as_deref(),
            Some("You are not authorized.")
        );
    }

    #[test]
    fn successful_envelope_yields_no_message() {
        let body = r#"{"status_code":20000,"status_message":"Ok.","tasks":[{"status_code":20000,"status_message":"Ok."}]}"#;
        assert_eq!(extract_error_message(body), None);
    }

    #[test]
    fn non_json_body_yields_no_message() {
        assert_eq!(extract_error_message("<html>502</html>"), None);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "é".repeat(1500);
        let out = truncate_body(&body);
        assert!(out.ends_with("...[truncated]"));
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials::new("user@example.com", "hunter2");
        let printed = format!("{:?}", creds);
        assert!(printed.contains("user@example.com"));
        assert!(!printed.contains("hunter2"));
    }
}
