// quarry-core/src/domain/result/classifier.rs

use serde_json::{Map, Value};

use super::{Document, DocumentSet, QueryResult, Row, StageOutcome, StatusSummary, TabularRows};
use crate::domain::capabilities::DataSourceKind;

const COUNT_FIELDS: [&str; 3] = ["rows_affected", "affected_rows", "row_count"];

pub struct ResultClassifier;

impl ResultClassifier {
    /// Classifies a raw response payload. First matching rule wins:
    ///
    /// 1. object with `result_type: "table"` -> rows, or empty when it has none
    /// 2. object with `result_type: "status"` -> status summary
    /// 3. sequence against a document target -> document set
    /// 4. sequence of row mappings against a relational target -> rows; a zero-length
    ///    sequence is empty
    /// 5. object exposing an affected-row count (any value, even -1) or a `status`
///    text -> status summary
    /// 6. sequence of `{stageName, result | error}` entries -> per-stage results
    /// 7. anything else -> opaque payload
    ///
    /// Sequences made only of stage entries are left to rule 6.
    pub fn classify(payload: Value, kind: DataSourceKind) -> QueryResult {
        match payload {
            Value::Object(obj) => Self::classify_object(obj),
            Value::Array(items) => Self::classify_sequence(items, kind),
            other => QueryResult::Opaque(other),
        }
    }

    fn classify_object(obj: Map<String, Value>) -> QueryResult {
        match obj.get("result_type").and_then(Value::as_str) {
            Some("table") => return table_result(&obj),
            Some("status") => return QueryResult::StatusSummary(status_summary(&obj)),
            _ => {}
        }

        let has_count = COUNT_FIELDS.iter().any(|f| obj.contains_key(*f));
        let has_status = obj.get("status").is_some_and(Value::is_string);
        if has_count || has_status {
            return QueryResult::StatusSummary(status_summary(&obj));
        }

        QueryResult::Opaque(Value::Object(obj))
    }

    fn classify_sequence(items: Vec<Value>, kind: DataSourceKind) -> QueryResult {
        let stage_entries = !items.is_empty() && items.iter().all(is_stage_entry);

        if !stage_entries {
            if items.is_empty() {
                return QueryResult::Empty;
            }
            match kind {
                DataSourceKind::Document => {
                    return QueryResult::DocumentSet(DocumentSet {
                        documents: items.into_iter().map(|v| Document(into_row(v))).collect(),
                    });
                }
                DataSourceKind::Relational => match items.first() {
                    Some(Value::Object(first)) if first.is_empty() => return QueryResult::Empty,
                    Some(Value::Object(_)) => {
                        return QueryResult::TabularRows(TabularRows {
                            rows: items.into_iter().map(into_row).collect(),
                        });
                    }
                    _ => return QueryResult::Opaque(Value::Array(items)),
                },
            }
        }

        let outcomes = items
            .into_iter()
            .map(|entry| stage_outcome(entry, kind))
            .collect();
        QueryResult::StageResultSet(outcomes)
    }
}

fn table_result(obj: &Map<String, Value>) -> QueryResult {
    let rows = obj
        .get("result")
        .or_else(|| obj.get("rows"))
        .and_then(Value::as_array);

    match rows {
        Some(rows) if !rows.is_empty() => QueryResult::TabularRows(TabularRows {
            rows: rows.iter().cloned().map(into_row).collect(),
        }),
        _ => QueryResult::Empty,
    }
}

fn status_summary(obj: &Map<String, Value>) -> StatusSummary {
    let rows_affected = COUNT_FIELDS
        .iter()
        .find_map(|f| obj.get(*f).and_then(Value::as_i64));

    let status = obj
        .get("result")
        .and_then(|r| r.get("status"))
        .or_else(|| obj.get("status"))
        .and_then(Value::as_str)
        .map(str::to_string);

    StatusSummary {
        rows_affected,
        status,
    }
}

fn stage_name_of(obj: &Map<String, Value>) -> Option<&str> {
    obj.get("stageName")
        .or_else(|| obj.get("stage_name"))
        .and_then(Value::as_str)
}

fn is_stage_entry(value: &Value) -> bool {
    match value {
        Value::Object(obj) => {
            stage_name_of(obj).is_some() && (obj.contains_key("result") || obj.contains_key("error"))
        }
        _ => false,
    }
}

fn stage_outcome(entry: Value, kind: DataSourceKind) -> StageOutcome {
    let Value::Object(mut obj) = entry else {
        return StageOutcome::Failed {
            stage_name: String::new(),
            error: "malformed stage entry".to_string(),
        };
    };
    let stage_name = stage_name_of(&obj).unwrap_or_default().to_string();

    match obj.remove("error") {
        Some(Value::Null) | None => {
            let result = match obj.remove("result") {
                Some(Value::Null) | None => QueryResult::Empty,
                Some(nested) => ResultClassifier::classify(nested, kind),
            };
            StageOutcome::Completed {
                stage_name,
                result: Box::new(result),
            }
        }
        Some(Value::String(error)) => StageOutcome::Failed { stage_name, error },
        Some(other) => StageOutcome::Failed {
            stage_name,
            error: other.to_string(),
        },
    }
}

/// Row mapping for an element; scalars become a single `value` column.
fn into_row(value: Value) -> Row {
    match value {
        Value::Object(obj) => obj,
        other => {
            let mut row = Map::new();
            row.insert("value".to_string(), other);
            row
        }
    }
}
