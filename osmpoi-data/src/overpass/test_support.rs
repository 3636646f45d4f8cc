//! Test utilities for Overpass executors.
//!
//! This module provides [`StubQueryExecutor`], a deterministic test double
//! for [`QueryExecutor`] that returns pre-configured responses without
//! making actual HTTP requests.

use std::cell::RefCell;
use std::time::Duration;

use super::{QueryError, QueryExecutor};

/// Stub `QueryExecutor` for testing.
///
/// Records every query it receives so tests can assert on the generated
/// Overpass QL.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use osmpoi_data::overpass::QueryExecutor;
/// use osmpoi_data::overpass::test_support::StubQueryExecutor;
///
/// let executor = StubQueryExecutor::with_response(serde_json::json!({ "elements": [] }));
/// let result = executor.execute("[out:json];();out;", Duration::from_secs(1));
/// assert!(result.is_ok());
/// assert_eq!(executor.last_query().as_deref(), Some("[out:json];();out;"));
/// ```
#[derive(Debug, Clone)]
pub struct StubQueryExecutor {
    response: Result<serde_json::Value, QueryError>,
    queries: RefCell<Vec<(String, Duration)>>,
}

impl StubQueryExecutor {
    /// Create an executor that returns `response` for every query.
    #[must_use]
    pub fn with_response(response: serde_json::Value) -> Self {
        Self {
            response: Ok(response),
            queries: RefCell::new(Vec::new()),
        }
    }

    /// Create an executor that fails every query with `error`.
    #[must_use]
    pub fn with_error(error: QueryError) -> Self {
        Self {
            response: Err(error),
            queries: RefCell::new(Vec::new()),
        }
    }

    /// The most recent query, if any.
    #[must_use]
    pub fn last_query(&self) -> Option<String> {
        self.queries.borrow().last().map(|(query, _)| query.clone())
    }

    /// The timeout passed with the most recent query, if any.
    #[must_use]
    pub fn last_timeout(&self) -> Option<Duration> {
        self.queries.borrow().last().map(|(_, timeout)| *timeout)
    }

    /// Number of queries executed.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.queries.borrow().len()
    }
}

impl QueryExecutor for StubQueryExecutor {
    fn execute(&self, query: &str, timeout: Duration) -> Result<serde_json::Value, QueryError> {
        self.queries.borrow_mut().push((query.to_owned(), timeout));
        self.response.clone()
    }
}
