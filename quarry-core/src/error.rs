// quarry-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuarryError {
    // --- DOMAIN ERRORS (composition, wizard transitions) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (transport, remote, config) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- GENERIC / APPLICATION ERRORS ---
    #[error("Internal Error: {0}")]
    InternalError(String),
}

impl QuarryError {
    /// True when the error was raised before anything left the process.
    pub fn is_composition(&self) -> bool {
        matches!(self, QuarryError::Domain(e) if e.is_composition())
    }

    /// The single user-facing line for this failure.
    ///
    /// Remote and transport failures combine the generic fallback with whatever
    /// detail the server supplied; local errors are shown as-is.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            QuarryError::Infrastructure(InfrastructureError::Remote { detail }) => {
                format!("{}: {}", fallback, detail)
            }
            QuarryError::Infrastructure(InfrastructureError::Http(e)) => {
                format!("{}: {}", fallback, e)
            }
            other => other.to_string(),
        }
    }
}

impl From<std::io::Error> for QuarryError {
    fn from(err: std::io::Error) -> Self {
        QuarryError::Infrastructure(InfrastructureError::Io(err))
    }
}
