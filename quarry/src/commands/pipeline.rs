// quarry/src/commands/pipeline.rs
//
// USE CASE: Run an aggregation pipeline described in a YAML stages file.

use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

use quarry_core::application::Dispatcher;
use quarry_core::domain::composer::CommandComposer;
use quarry_core::domain::pipeline::list::StageDefinition;
use quarry_core::domain::pipeline::{ExecutionScope, PipelineList};
use quarry_core::domain::{Capabilities, DataSourceKind};

use super::{connect, open_workspace, report};

pub async fn execute(
    workspace_dir: &Path,
    file: PathBuf,
    collection: String,
    selected: bool,
    dry_run: bool,
) -> anyhow::Result<()> {
    let stages = load_stages(&file)?;
    let scope = if selected {
        ExecutionScope::Selected
    } else {
        ExecutionScope::All
    };
    println!(
        "🔗 Pipeline: {} stage(s) loaded from {}",
        stages.len(),
        file.display()
    );

    // Every local check runs before the config is even read.
    let request = CommandComposer::pipeline(&stages, scope, &collection)?;

    if dry_run {
        let plan = Dispatcher::plan(&request, DataSourceKind::Document, &Capabilities::default());
        println!("🧪 Dry run ({})", plan.endpoint);
        println!("{}", plan.body["query"].as_str().unwrap_or_default());
        return Ok(());
    }

    let conn = connect(workspace_dir)?;
    let mut ws = open_workspace(&conn).await?;
    ws.stages = stages;
    ws.set_pipeline_collection(collection);

    let outcome = ws.execute_pipeline(&conn.backend, scope).await;
    report(&ws, outcome)
}

fn load_stages(file: &Path) -> anyhow::Result<PipelineList> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read stages file {}", file.display()))?;
    let definitions: Vec<StageDefinition> = serde_yaml::from_str(&content)
        .with_context(|| format!("Invalid stages file {}", file.display()))?;
    Ok(PipelineList::from_definitions(definitions))
}
