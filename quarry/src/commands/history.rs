// quarry/src/commands/history.rs
//
// USE CASE: Browse the permanent query history of the configured database.

use comfy_table::{ContentArrangement, Table};
use std::path::Path;

use quarry_core::domain::history::HistoryEntry;
use quarry_core::infrastructure::HistoryStore;
use quarry_core::infrastructure::config::load_workspace_config;

pub fn execute(
    workspace_dir: &Path,
    search: Option<String>,
    limit: usize,
    commands: bool,
) -> anyhow::Result<()> {
    let config = load_workspace_config(workspace_dir)?;
    let store = HistoryStore::open(config.history_path(workspace_dir))?;

    let Some(history) = store.get(&config.database) else {
        println!("No query history for '{}' yet.", config.database);
        return Ok(());
    };

    if commands {
        for cmd in history.commands().into_iter().take(limit) {
            println!("{}", cmd);
        }
        return Ok(());
    }

    let entries = match &search {
        Some(term) => history.search(term, limit),
        None => history.recent(limit),
    };
    if entries.is_empty() {
        println!("No matching queries.");
        return Ok(());
    }
    println!("{}", entries_table(&entries));
    println!("({} of {} queries)", entries.len(), history.entries().len());
    Ok(())
}

fn entries_table(entries: &[&HistoryEntry]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Executed at", "Query"]);
    for entry in entries {
        table.add_row(vec![
            entry.executed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            entry.query.clone(),
        ]);
    }
    table
}
