// quarry-core/src/application/mod.rs

pub mod dispatcher;
pub mod normalization;
pub mod workspace;

#[cfg(test)]
mod testing;

// --- RE-EXPORTS ---
// Lets the CLI write `use quarry_core::application::{Workspace, run_analysis};`
// without knowing the file layout.

pub use dispatcher::{DispatchPlan, Dispatcher};
pub use normalization::{run_analysis, run_normalization};
pub use workspace::{CompletedExecution, Generation, Outcome, PendingExecution, Workspace};
