// quarry/src/commands/query.rs
//
// USE CASE: Execute raw query text (direct mode).

use std::path::Path;

use quarry_core::domain::DataSourceKind;
use quarry_core::domain::composer::CommandComposer;
use quarry_core::domain::history::split_commands;
use quarry_core::infrastructure::HistoryStore;

use super::{connect, open_workspace, report};

pub async fn execute(workspace_dir: &Path, query: String) -> anyhow::Result<()> {
    // Blank text fails here, before any config or network access.
    CommandComposer::direct(&query)?;

    let conn = connect(workspace_dir)?;
    let statements = match conn.config.kind {
        DataSourceKind::Relational => split_commands(&query),
        DataSourceKind::Document => vec![query],
    };
    if statements.is_empty() {
        anyhow::bail!("Nothing to execute: only comments found");
    }
    let mut ws = open_workspace(&conn).await?;

    let mut store = HistoryStore::open(conn.config.history_path(workspace_dir))?;
    *ws.history_mut() = store.take(&conn.config.database);

    let mut outcome = Ok(());
    for statement in statements {
        println!("\n⚡ {}", statement);
        let executed = ws.execute_direct(&conn.backend, &statement).await;
        outcome = report(&ws, executed);
        if outcome.is_err() {
            break;
        }
    }

    println!("\n🕘 {} statement(s) in history", ws.history().entries().len());
    // Whatever ran before a failure is kept.
    store.put(&conn.config.database, std::mem::take(ws.history_mut()));
    store.save()?;
    outcome
}
