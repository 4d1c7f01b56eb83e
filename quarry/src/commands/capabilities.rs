// quarry/src/commands/capabilities.rs
//
// USE CASE: Show the feature flags the backend declares.

use comfy_table::Table;
use std::path::Path;

use quarry_core::domain::AggregationMode;
use quarry_core::ports::backend::QueryBackend;

use super::connect;

pub async fn execute(workspace_dir: &Path) -> anyhow::Result<()> {
    let conn = connect(workspace_dir)?;
    let caps = conn.backend.fetch_capabilities().await?;

    let flags = [
        ("aggregation pipeline", caps.supports_aggregation_pipeline),
        ("aggregation", caps.supports_aggregation),
        ("views", caps.supports_views),
        ("partitions", caps.supports_partitions),
        ("procedures", caps.supports_procedures),
        ("triggers", caps.supports_triggers),
        ("users", caps.supports_users),
    ];

    let mut table = Table::new();
    table.set_header(vec!["Feature", "Supported"]);
    for (name, supported) in flags {
        table.add_row(vec![name, if supported { "yes" } else { "no" }]);
    }
    println!("{}", table);

    let landing = AggregationMode::resolve(AggregationMode::default(), &caps);
    println!("🧭 Aggregation workspace opens in {:?} mode", landing);
    Ok(())
}
