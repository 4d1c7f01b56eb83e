// quarry-core/src/domain/result/mod.rs

pub mod classifier;
pub mod render;

use serde::Serialize;
use serde_json::{Map, Value};

pub use classifier::ResultClassifier;
pub use render::cell_text;

pub type Row = Map<String, Value>;

static NULL: Value = Value::Null;

/// Display-ready outcome of one execution. Exactly one variant per execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", content = "data", rename_all = "snake_case")]
pub enum QueryResult {
    TabularRows(TabularRows),
    DocumentSet(DocumentSet),
    StatusSummary(StatusSummary),
    StageResultSet(Vec<StageOutcome>),
    Empty,
    Opaque(Value),
}

impl QueryResult {
    /// Single-entry stage set wrapping the combined result of a pipeline call.
    pub fn pipeline(label: impl Into<String>, combined: QueryResult) -> Self {
        QueryResult::StageResultSet(vec![StageOutcome::Completed {
            stage_name: label.into(),
            result: Box::new(combined),
        }])
    }

    pub fn shape_name(&self) -> &'static str {
        match self {
            Self::TabularRows(_) => "tabular_rows",
            Self::DocumentSet(_) => "document_set",
            Self::StatusSummary(_) => "status_summary",
            Self::StageResultSet(_) => "stage_result_set",
            Self::Empty => "empty",
            Self::Opaque(_) => "opaque",
        }
    }
}

/// Rows sharing the key set of the first row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabularRows {
    pub rows: Vec<Row>,
}

impl TabularRows {
    pub fn columns(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Values of `row` in column order; missing keys read as null.
    pub fn cells<'a>(&self, row: &'a Row, columns: &[String]) -> Vec<&'a Value> {
        columns
            .iter()
            .map(|c| row.get(c).unwrap_or(&NULL))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSet {
    pub documents: Vec<Document>,
}

/// A schema-less record. Its primary field is its first key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Document(pub Row);

impl Document {
    pub fn primary_field(&self) -> &str {
        self.0.keys().next().map(String::as_str).unwrap_or("doc_id")
    }

    pub fn primary_value(&self) -> String {
        match self.0.get(self.primary_field()) {
            None | Some(Value::Null) => "unknown".to_string(),
            Some(v) => cell_text(v),
        }
    }

    /// Every field except the primary one, in document order.
    pub fn other_fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        let primary = self.primary_field().to_string();
        self.0.iter().filter(move |(k, _)| **k != primary)
    }
}

/// Outcome of a statement that returns no rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows_affected: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl StatusSummary {
    pub fn message(&self) -> String {
        match &self.status {
            Some(status) => status.clone(),
            None => format!("Rows affected: {}", self.rows_affected.unwrap_or(0)),
        }
    }
}

/// Per-stage entry of a [`QueryResult::StageResultSet`]. Errors stay scoped to their stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StageOutcome {
    Completed {
        stage_name: String,
        result: Box<QueryResult>,
    },
    Failed {
        stage_name: String,
        error: String,
    },
}

impl StageOutcome {
    pub fn stage_name(&self) -> &str {
        match self {
            Self::Completed { stage_name, .. } | Self::Failed { stage_name, .. } => stage_name,
        }
    }
}
