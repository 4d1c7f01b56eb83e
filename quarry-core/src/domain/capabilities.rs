// quarry-core/src/domain/capabilities.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Shape of the connected data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DataSourceKind {
    /// Fixed-column tables queried with SQL-like text.
    #[default]
    #[serde(rename = "sql", alias = "relational")]
    Relational,
    /// Schema-less collections of heterogeneous documents.
    #[serde(rename = "nosql", alias = "document")]
    Document,
}

impl DataSourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relational => "sql",
            Self::Document => "nosql",
        }
    }

    /// "table" or "collection", for messages.
    pub fn target_noun(&self) -> &'static str {
        match self {
            Self::Relational => "table",
            Self::Document => "collection",
        }
    }
}

impl fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DataSourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sql" | "relational" => Ok(Self::Relational),
            "nosql" | "document" => Ok(Self::Document),
            _ => Err(format!("Unknown data source kind: {}", s)),
        }
    }
}

/// Feature flags declared by the backend, fetched once per workspace activation.
///
/// Composition and dispatch branch on these flags only; support is never
/// inferred from the shape of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Capabilities {
    pub supports_aggregation_pipeline: bool,
    pub supports_aggregation: bool,
    pub supports_views: bool,
    pub supports_partitions: bool,
    pub supports_procedures: bool,
    pub supports_triggers: bool,
    pub supports_users: bool,
}

/// Sub-modes of the aggregation workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMode {
    #[default]
    Visual,
    Direct,
    Pipeline,
}

impl AggregationMode {
    pub fn is_available(&self, caps: &Capabilities) -> bool {
        match self {
            Self::Pipeline => caps.supports_aggregation_pipeline,
            Self::Visual | Self::Direct => true,
        }
    }

    /// Mode actually shown once capabilities are known.
    ///
    /// The visual landing mode upgrades to the pipeline builder when the backend
    /// supports it; a pipeline request falls back to visual when it does not.
    pub fn resolve(requested: AggregationMode, caps: &Capabilities) -> AggregationMode {
        match requested {
            Self::Visual if caps.supports_aggregation_pipeline => Self::Pipeline,
            Self::Pipeline if !caps.supports_aggregation_pipeline => Self::Visual,
            other => other,
        }
    }
}
