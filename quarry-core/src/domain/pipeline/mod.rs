// quarry-core/src/domain/pipeline/mod.rs

pub mod list;
pub mod stage;
pub mod validator;

pub use list::PipelineList;
pub use stage::{Direction, Stage, StageField, StageId};
pub use validator::{ExecutionScope, StageValidator, ValidatedPipeline};
