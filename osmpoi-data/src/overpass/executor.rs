//! Executor trait for the single remote call made per fetch.

use std::time::Duration;

use thiserror::Error;

/// Errors from [`QueryExecutor::execute`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The request did not complete within the timeout.
    #[error("request to {endpoint} timed out after {timeout_secs}s")]
    Timeout {
        /// Endpoint that was queried.
        endpoint: String,
        /// Timeout that elapsed, in seconds.
        timeout_secs: u64,
    },
    /// The server answered with a non-success status.
    #[error("request to {endpoint} failed with HTTP {status}: {message}")]
    Http {
        /// Endpoint that was queried.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Transport-supplied description.
        message: String,
    },
    /// The request failed before a response arrived.
    #[error("request to {endpoint} failed: {message}")]
    Network {
        /// Endpoint that was queried.
        endpoint: String,
        /// Transport-supplied description.
        message: String,
    },
    /// The response body was not JSON.
    #[error("response body is not valid JSON: {message}")]
    Body {
        /// Parser-supplied description.
        message: String,
    },
}

/// Run an Overpass QL query and return the parsed JSON response.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use osmpoi_data::overpass::{QueryError, QueryExecutor};
///
/// struct Empty;
///
/// impl QueryExecutor for Empty {
///     fn execute(&self, _query: &str, _timeout: Duration) -> Result<serde_json::Value, QueryError> {
///         Ok(serde_json::json!({ "elements": [] }))
///     }
/// }
///
/// let json = Empty.execute("[out:json];node(1);out;", Duration::from_secs(5))?;
/// assert!(json["elements"].as_array().is_some_and(Vec::is_empty));
/// # Ok::<(), QueryError>(())
/// ```
pub trait QueryExecutor {
    /// Send `query` and return the decoded JSON body.
    ///
    /// `timeout` mirrors the server-side timeout embedded in the query.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] when the transport fails or the body is not
    /// JSON.
    fn execute(&self, query: &str, timeout: Duration) -> Result<serde_json::Value, QueryError>;
}

impl<T: QueryExecutor + ?Sized> QueryExecutor for &T {
    fn execute(&self, query: &str, timeout: Duration) -> Result<serde_json::Value, QueryError> {
        (**self).execute(query, timeout)
    }
}
