// quarry-core/src/domain/pipeline/stage.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a stage, independent of its position in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageId(u64);

impl StageId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One step of an aggregation pipeline.
///
/// `query` is kept as raw text; only the validator interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    pub name: String,
    pub query: String,
    pub selected: bool,
}

impl Stage {
    pub(crate) fn new(id: StageId) -> Self {
        Self {
            id,
            name: format!("Stage {}", id),
            query: String::new(),
            selected: false,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.query.trim().is_empty()
    }

    pub(crate) fn apply(&mut self, field: StageField) {
        match field {
            StageField::Name(name) => self.name = name,
            StageField::Query(query) => self.query = query,
            StageField::Selected(selected) => self.selected = selected,
        }
    }
}

/// A user edit targeting one field of a stage.
#[derive(Debug, Clone, PartialEq)]
pub enum StageField {
    Name(String),
    Query(String),
    Selected(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}
