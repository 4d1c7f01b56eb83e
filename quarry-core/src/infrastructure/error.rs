// quarry-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- TRANSPORT ---
    #[error("HTTP transport error: {0}")]
    #[diagnostic(
        code(quarry::infra::http),
        help("Check that the workspace API is reachable at the configured base_url.")
    )]
    Http(#[from] reqwest::Error),

    // --- REMOTE (non-success response) ---
    #[error("{detail}")]
    #[diagnostic(code(quarry::infra::remote))]
    Remote { detail: String },

    #[error("Malformed response: {0}")]
    #[diagnostic(code(quarry::infra::json))]
    Json(#[from] serde_json::Error),

    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(quarry::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(quarry::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(quarry::infra::config_invalid))]
    InvalidConfig(#[from] validator::ValidationErrors),

    #[error("Workspace configuration not found at '{0}'")]
    #[diagnostic(code(quarry::infra::config_missing))]
    ConfigNotFound(String),
}
