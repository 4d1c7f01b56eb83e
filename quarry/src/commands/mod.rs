// quarry/src/commands/mod.rs

pub mod capabilities;
pub mod history;
pub mod normalize;
pub mod pipeline;
pub mod query;
pub mod targets;
pub mod visual;

use std::path::Path;

use quarry_core::QuarryError;
use quarry_core::application::{Outcome, Workspace};
use quarry_core::infrastructure::adapters::HttpBackend;
use quarry_core::infrastructure::config::{WorkspaceConfig, load_workspace_config};
use quarry_core::ports::backend::QueryBackend;

use crate::render::print_result;

/// Loaded configuration plus the transport built from it.
pub struct Connection {
    pub config: WorkspaceConfig,
    pub backend: HttpBackend,
}

pub fn connect(workspace_dir: &Path) -> anyhow::Result<Connection> {
    let config = load_workspace_config(workspace_dir)?;
    println!(
        "⚙️  Database: {} ({}) at {}",
        config.database, config.kind, config.base_url
    );
    let backend = HttpBackend::new(&config)?;
    Ok(Connection { config, backend })
}

/// Activates a workspace: capabilities are fetched once and injected.
pub async fn open_workspace(conn: &Connection) -> anyhow::Result<Workspace> {
    let caps = conn.backend.fetch_capabilities().await?;
    Ok(Workspace::new(conn.config.kind, caps))
}

/// Prints whatever the workspace holds after an execution.
///
/// Composition errors bubble up as diagnostics; remote failures come back as the
/// workspace's single user-facing message.
pub fn report(ws: &Workspace, outcome: Result<Outcome, QuarryError>) -> anyhow::Result<()> {
    match outcome {
        Ok(_) => {
            if let Some(message) = ws.message() {
                println!("✅ {}", message);
            }
            if let Some(result) = ws.result() {
                print_result(result);
            }
            Ok(())
        }
        Err(e) if e.is_composition() => Err(e.into()),
        Err(e) => Err(anyhow::anyhow!(
            ws.error().map(str::to_string).unwrap_or_else(|| e.to_string())
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::domain::{Capabilities, DataSourceKind, DomainError};

    #[test]
    fn test_remote_failure_is_returned_not_exited() {
        let ws = Workspace::new(DataSourceKind::Relational, Capabilities::default());
        let err = quarry_core::infrastructure::error::InfrastructureError::Remote {
            detail: "no such table: userz".into(),
        };
        let reported = report(&ws, Err(err.into()));
        assert!(matches!(&reported, Err(e) if e.to_string() == "no such table: userz"));
    }

    #[test]
    fn test_composition_error_keeps_its_type() {
        let ws = Workspace::new(DataSourceKind::Relational, Capabilities::default());
        let reported = report(&ws, Err(DomainError::EmptyQuery.into()));
        let kept = reported
            .err()
            .and_then(|e| e.downcast::<QuarryError>().ok())
            .is_some_and(|e| matches!(e, QuarryError::Domain(DomainError::EmptyQuery)));
        assert!(kept);
    }
}
