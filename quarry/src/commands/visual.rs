// quarry/src/commands/visual.rs
//
// USE CASE: Visual aggregation built from discrete fields.

use std::path::Path;

use quarry_core::application::Dispatcher;
use quarry_core::domain::composer::CommandComposer;
use quarry_core::domain::visual::VisualBuilder;
use quarry_core::domain::{Capabilities, DataSourceKind};

use super::{connect, open_workspace, report};
use crate::cli::VisualArgs;

pub async fn execute(workspace_dir: &Path, args: VisualArgs) -> anyhow::Result<()> {
    let builder = builder_from(&args);

    if args.dry_run {
        let kind = args.kind.unwrap_or_default();
        let request = CommandComposer::visual(&builder, kind)?;
        let plan = Dispatcher::plan(&request, kind, &Capabilities::default());
        println!("🧪 Dry run ({} -> {})", kind, plan.endpoint);
        println!("{}", serde_json::to_string_pretty(&plan.body)?);
        return Ok(());
    }

    let conn = connect(workspace_dir)?;
    if let Some(kind) = args.kind.filter(|k| *k != conn.config.kind) {
        tracing::warn!(requested = %kind, configured = %conn.config.kind, "--kind ignored outside --dry-run");
    }
    let mut ws = open_workspace(&conn).await?;
    ws.visual = builder;

    let outcome = ws.execute_visual(&conn.backend).await;
    report(&ws, outcome)
}

fn builder_from(args: &VisualArgs) -> VisualBuilder {
    let mut builder = VisualBuilder::for_table(args.table.clone());
    builder.table_alias = args.alias.clone().unwrap_or_default();
    builder.set_select_fields(args.select_fields.clone());
    builder.group_by = args.group_by.clone().unwrap_or_default();
    builder.order_by = args.order_by.clone().unwrap_or_default();
    builder.order_direction = args.order_direction();

    if let Some(join) = &args.join {
        builder.join.table = join.clone();
        builder.join.on = args.join_on.clone().unwrap_or_default();
        if let Some((local, foreign)) = args.lookup.as_deref().and_then(|l| l.split_once('=')) {
            builder.join.local_field = local.trim().to_string();
            builder.join.foreign_field = foreign.trim().to_string();
        }
    }
    builder
}
