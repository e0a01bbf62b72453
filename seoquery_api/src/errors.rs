//! Error types for the API client.

/// Errors that can occur when building or sending API requests.
///
/// The `Display` output of every variant is a single human-readable message
/// suitable for showing to the user as-is.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request never produced an HTTP response (DNS, TLS, timeout, ...).
    #[error("{0}")]
    Transport(String),
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    HttpStatus { status: u16, message: String },
    /// The envelope or the task carried a non-success status code.
    #[error("{message}")]
    Api { status_code: i64, message: String },
    /// The response body could not be decoded into the expected shape.
    #[error("Failed to parse response: {0}")]
    Decode(String),
    /// A filter clause or tree was rejected before sending.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
}
