// quarry-core/src/domain/target.rs

use serde::{Deserialize, Serialize};

/// One entry of the remote table/collection listing.
///
/// The backend sends either a bare name or an object with a name and an optional
/// document count; both forms are treated alike through [`TargetEntry::name`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetEntry {
    Name(String),
    Detailed {
        name: String,
        #[serde(default, alias = "count", skip_serializing_if = "Option::is_none")]
        document_count: Option<u64>,
    },
}

impl TargetEntry {
    pub fn name(&self) -> &str {
        match self {
            TargetEntry::Name(name) => name,
            TargetEntry::Detailed { name, .. } => name,
        }
    }

    pub fn document_count(&self) -> Option<u64> {
        match self {
            TargetEntry::Name(_) => None,
            TargetEntry::Detailed { document_count, .. } => *document_count,
        }
    }
}
