// quarry/src/commands/targets.rs
//
// USE CASE: List the tables or collections of the configured database.

use comfy_table::Table;
use std::path::Path;

use quarry_core::ports::backend::QueryBackend;

use super::connect;

pub async fn execute(workspace_dir: &Path) -> anyhow::Result<()> {
    let conn = connect(workspace_dir)?;
    let targets = conn.backend.list_targets().await?;
    let noun = conn.config.kind.target_noun();

    if targets.is_empty() {
        println!("No {}s found.", noun);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![noun.to_string(), "documents".to_string()]);
    for target in &targets {
        let count = target
            .document_count()
            .map(|n| n.to_string())
            .unwrap_or_default();
        table.add_row(vec![target.name().to_string(), count]);
    }
    println!("{}", table);
    println!("({} {}(s))", targets.len(), noun);
    Ok(())
}
