// quarry-core/src/infrastructure/config/workspace.rs

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use validator::Validate;

use crate::domain::capabilities::DataSourceKind;
use crate::infrastructure::error::InfrastructureError;

const CONFIG_CANDIDATES: [&str; 2] = ["quarry.yaml", "quarry.yml"];

/// Connection to one remote database workspace.
///
/// Capability flags are deliberately absent: they are fetched from the backend
/// once per activation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WorkspaceConfig {
    #[validate(url)]
    pub base_url: String,

    #[validate(length(min = 1))]
    pub database: String,

    #[serde(default)]
    pub kind: DataSourceKind,

    /// Handed to the transport; the core enforces no timeout of its own.
    #[validate(range(min = 1))]
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Permanent query history, relative to the workspace directory.
    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,
}

fn default_history_file() -> PathBuf {
    PathBuf::from("query_history.json")
}

impl WorkspaceConfig {
    pub fn history_path(&self, workspace_dir: &Path) -> PathBuf {
        workspace_dir.join(&self.history_file)
    }
}

// --- LOADER ---

#[instrument(skip(workspace_dir))]
pub fn load_workspace_config(workspace_dir: &Path) -> Result<WorkspaceConfig, InfrastructureError> {
    // 1. Discovery
    let config_path = find_config(workspace_dir)?;
    info!(path = ?config_path, "Loading workspace config");

    // 2. YAML
    let content = fs::read_to_string(&config_path)?;
    let mut config: WorkspaceConfig = serde_yaml::from_str(&content)?;

    // 3. Env layering (QUARRY_BASE_URL=http://... quarry query ...)
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    // 4. Validation after overrides, so a bad override is caught too
    config.validate()?;

    Ok(config)
}

fn find_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    CONFIG_CANDIDATES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.exists())
        .ok_or_else(|| {
            InfrastructureError::ConfigNotFound(format!(
                "{} (checked: {:?})",
                root.display(),
                CONFIG_CANDIDATES
            ))
        })
}

fn apply_env_overrides<F>(config: &mut WorkspaceConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("QUARRY_BASE_URL") {
        info!(old = ?config.base_url, new = ?val, "Overriding base_url via ENV");
        config.base_url = val;
    }
    if let Some(val) = lookup("QUARRY_DATABASE") {
        info!(old = ?config.database, new = ?val, "Overriding database via ENV");
        config.database = val;
    }
    if let Some(kind) = lookup("QUARRY_KIND").and_then(|v| v.parse::<DataSourceKind>().ok()) {
        info!(old = ?config.kind, new = ?kind, "Overriding kind via ENV");
        config.kind = kind;
    }
}
