//! Query keys and the state a query cycle moves through

use std::fmt;
use std::sync::Arc;

use crate::domain::token::AggregatedResult;
use crate::error::ErrorKind;

/// The raw user-entered string, used verbatim as the cache key.
///
/// No trimming or case folding happens here: `"alice.eth"` and `" alice.eth"`
/// are different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(String);

impl QueryKey {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for QueryKey {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for QueryKey {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current state of the lookup, replaced wholesale on every trigger
#[derive(Debug, Clone, Default)]
pub enum QueryState {
    #[default]
    Idle,
    Loading,
    Success(Arc<AggregatedResult>),
    Failure(ErrorKind, String),
}

impl QueryState {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    pub fn result(&self) -> Option<&Arc<AggregatedResult>> {
        match self {
            QueryState::Success(result) => Some(result),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<(ErrorKind, &str)> {
        match self {
            QueryState::Failure(kind, message) => Some((*kind, message.as_str())),
            _ => None,
        }
    }
}
