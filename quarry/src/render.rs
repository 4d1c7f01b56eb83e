// quarry/src/render.rs
//
// Terminal rendering of classified results.

use comfy_table::{ContentArrangement, Table};

use quarry_core::domain::QueryResult;
use quarry_core::domain::result::{DocumentSet, StageOutcome, TabularRows, cell_text};

pub fn print_result(result: &QueryResult) {
    for line in render_result(result) {
        println!("{}", line);
    }
}

pub fn render_result(result: &QueryResult) -> Vec<String> {
    match result {
        QueryResult::TabularRows(rows) => vec![
            rows_table(rows).to_string(),
            format!("({} row(s))", rows.len()),
        ],
        QueryResult::DocumentSet(set) => documents(set),
        QueryResult::StatusSummary(summary) => vec![format!("✅ {}", summary.message())],
        QueryResult::StageResultSet(outcomes) => outcomes.iter().flat_map(stage).collect(),
        QueryResult::Empty => vec!["No results".to_string()],
        QueryResult::Opaque(value) => {
            vec![serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())]
        }
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn rows_table(rows: &TabularRows) -> Table {
    let columns = rows.columns();
    let mut table = new_table();
    table.set_header(columns.clone());
    for row in &rows.rows {
        table.add_row(
            rows.cells(row, &columns)
                .into_iter()
                .map(cell_text)
                .collect::<Vec<_>>(),
        );
    }
    table
}

fn documents(set: &DocumentSet) -> Vec<String> {
    let mut lines = Vec::new();
    for doc in &set.documents {
        lines.push(format!("📄 {}: {}", doc.primary_field(), doc.primary_value()));
        let mut table = new_table();
        table.set_header(vec!["Field", "Value"]);
        for (key, value) in doc.other_fields() {
            table.add_row(vec![key.clone(), cell_text(value)]);
        }
        lines.push(table.to_string());
    }
    lines.push(format!("({} document(s))", set.documents.len()));
    lines
}

fn stage(outcome: &StageOutcome) -> Vec<String> {
    match outcome {
        StageOutcome::Completed { stage_name, result } => {
            let mut lines = vec![format!("▶ {}", stage_name)];
            lines.extend(render_result(result));
            lines
        }
        StageOutcome::Failed { stage_name, error } => {
            vec![format!("▶ {}", stage_name), format!("❌ {}", error)]
        }
    }
}
