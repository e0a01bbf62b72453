use serde::{Deserialize, Deserializer, Serialize};

/// Status code the API uses for a successful envelope or task.
pub const SUCCESS_STATUS: i64 = 20000;

/// Top-level response envelope shared by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    pub status_code: i64,
    pub status_message: String,
    #[serde(default)]
    pub tasks_count: i64,
    #[serde(default)]
    pub tasks_error: i64,
    /// `null` on envelope-level failures such as bad credentials.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tasks: Vec<Task<T>>,
}

/// One task inside the envelope. Requests carry exactly one task.
#[derive(Debug, Serialize, Deserialize)]
pub struct Task<T> {
    #[serde(default)]
    pub id: String,
    pub status_code: i64,
    pub status_message: String,
    pub result: Option<Vec<ItemsResult<T>>>,
}

/// The result object of a task: counters plus the page of items.
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemsResult<T> {
    #[serde(default)]
    pub total_count: i64,
    #[serde(default)]
    pub items_count: i64,
    pub items: Option<Vec<T>>,
}

/// A page of items together with the server's total count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total matching items as reported by the server.
    pub total_count: i64,
    /// Offset the page was requested with.
    pub offset: u32,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn empty(offset: u32) -> Self {
        Self {
            total_count: 0,
            offset,
            items: Vec::new(),
        }
    }
}

/// Reads a list that may be absent or an explicit `null` as empty.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
