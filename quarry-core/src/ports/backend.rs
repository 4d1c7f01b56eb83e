// quarry-core/src/ports/backend.rs

// What the core needs from the remote database API, without knowing how it is reached.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

use crate::domain::capabilities::Capabilities;
use crate::domain::target::TargetEntry;
use crate::domain::wizard::NormalizationOutcome;
use crate::error::QuarryError;

/// Remote query endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// SQL-like text against a relational source.
    RelationalQuery,
    /// Filter documents or a composed pipeline invocation string.
    DocumentQuery,
    /// Structured visual-aggregation parameters.
    Aggregation,
}

impl Endpoint {
    /// Path segment under `/api/db/<database>/`.
    pub fn path(&self) -> &'static str {
        match self {
            Self::RelationalQuery => "query",
            Self::DocumentQuery => "nosql_query",
            Self::Aggregation => "aggregation",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// One round trip. Returns the `result` payload of a successful response.
    async fn send(&self, endpoint: Endpoint, body: &Value) -> Result<Value, QuarryError>;

    async fn fetch_capabilities(&self) -> Result<Capabilities, QuarryError>;

    async fn list_targets(&self) -> Result<Vec<TargetEntry>, QuarryError>;

    async fn analyze_for_normalization(&self) -> Result<Value, QuarryError>;

    async fn normalize(&self, body: &Value) -> Result<NormalizationOutcome, QuarryError>;
}
