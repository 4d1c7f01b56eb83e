pub mod workspace;

pub use workspace::{WorkspaceConfig, load_workspace_config};
