//! HTTP-based `QueryExecutor` posting Overpass QL to an interpreter endpoint.
//!
//! # Architecture
//!
//! The [`QueryExecutor`] trait is synchronous to keep the library embeddable
//! in synchronous contexts. This executor bridges the async HTTP call to the
//! sync interface by blocking on a Tokio runtime internally. It performs a
//! single request per call: no retries and no rate limiting.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use super::executor::{QueryError, QueryExecutor};

/// Public Overpass interpreter.
pub const DEFAULT_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

/// Default user agent for Overpass requests.
pub const DEFAULT_USER_AGENT: &str = "osmpoi/0.1";

/// Default connect timeout in seconds.
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Errors raised while constructing an [`HttpQueryExecutor`].
#[derive(Debug, Error)]
pub enum ExecutorBuildError {
    /// The endpoint is not an absolute URL.
    #[error("invalid Overpass endpoint {endpoint:?}: {source}")]
    Endpoint {
        /// Rejected endpoint.
        endpoint: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Configuration for [`HttpQueryExecutor`].
#[derive(Debug, Clone)]
pub struct HttpQueryExecutorConfig {
    /// Interpreter URL (e.g., `"https://overpass-api.de/api/interpreter"`).
    pub endpoint: String,
    /// Connection establishment timeout.
    pub connect_timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpQueryExecutorConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpQueryExecutorConfig {
    /// Create a configuration targeting `endpoint`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Set the connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Overpass executor speaking HTTP.
///
/// The query is sent as the `data` form field of a POST request. The
/// per-call timeout applies to the whole request.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime, or inside a `current_thread` runtime, the
/// executor blocks on its own runtime. Inside a multi-threaded runtime it
/// uses [`tokio::task::block_in_place`] on the caller's handle.
pub struct HttpQueryExecutor {
    client: Client,
    endpoint: Url,
    runtime: Runtime,
}

impl std::fmt::Debug for HttpQueryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpQueryExecutor")
            .field("client", &self.client)
            .field("endpoint", &self.endpoint.as_str())
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl HttpQueryExecutor {
    /// Create an executor for `endpoint` with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is invalid or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ExecutorBuildError> {
        Self::with_config(HttpQueryExecutorConfig::new(endpoint))
    }

    /// Create an executor with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is invalid or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn with_config(config: HttpQueryExecutorConfig) -> Result<Self, ExecutorBuildError> {
        let endpoint =
            Url::parse(&config.endpoint).map_err(|source| ExecutorBuildError::Endpoint {
                endpoint: config.endpoint.clone(),
                source,
            })?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(ExecutorBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ExecutorBuildError::Runtime)?;
        Ok(Self {
            client,
            endpoint,
            runtime,
        })
    }

    /// Interpreter URL requests are sent to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn post_query(
        &self,
        query: &str,
        timeout: Duration,
    ) -> Result<serde_json::Value, QueryError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .timeout(timeout)
            .form(&[("data", query)])
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, timeout))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, timeout))?;

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|err| QueryError::Body {
                message: err.to_string(),
            })
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, timeout: Duration) -> QueryError {
        let endpoint = self.endpoint.to_string();
        if error.is_timeout() {
            return QueryError::Timeout {
                endpoint,
                timeout_secs: timeout.as_secs(),
            };
        }
        if let Some(status) = error.status() {
            return QueryError::Http {
                endpoint,
                status: status.as_u16(),
                message: error.to_string(),
            };
        }
        QueryError::Network {
            endpoint,
            message: error.to_string(),
        }
    }
}

impl QueryExecutor for HttpQueryExecutor {
    fn execute(&self, query: &str, timeout: Duration) -> Result<serde_json::Value, QueryError> {
        let future = self.post_query(query, timeout);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            // No runtime detected, or current_thread runtime: use our own runtime.
            _ => self.runtime.block_on(future),
        }
    }
}
