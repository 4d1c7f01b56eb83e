// quarry-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, PartialEq)]
pub enum DomainError {
    // --- COMPOSITION (detected before any network call) ---
    #[error("No stages selected for execution")]
    #[diagnostic(
        code(quarry::domain::empty_scope),
        help("Tick at least one stage, or execute all stages.")
    )]
    EmptyScope,

    #[error("Empty stages found: {}", .0.join(", "))]
    #[diagnostic(code(quarry::domain::blank_stage))]
    BlankStages(Vec<String>),

    #[error("Invalid JSON in stage \"{stage}\": {message}")]
    #[diagnostic(
        code(quarry::domain::stage_parse),
        help("Each stage must be a single JSON document, e.g. {{\"$match\": {{\"status\": \"active\"}}}}")
    )]
    StageParse { stage: String, message: String },

    #[error("Query cannot be empty")]
    #[diagnostic(code(quarry::domain::empty_query))]
    EmptyQuery,

    #[error("Please select a table/collection")]
    #[diagnostic(code(quarry::domain::missing_table))]
    MissingTable,

    #[error("Please add at least one field")]
    #[diagnostic(code(quarry::domain::no_select_fields))]
    NoSelectFields,

    #[error("Please enter a collection name to run the pipeline on")]
    #[diagnostic(code(quarry::domain::missing_collection))]
    MissingCollection,

    #[error("Aggregation pipelines are not supported by this database")]
    #[diagnostic(
        code(quarry::domain::unsupported_mode),
        help("Use the visual builder or a direct query instead.")
    )]
    UnsupportedMode,

    // --- NORMALIZATION WIZARD ---
    #[error("Please select a normal form")]
    #[diagnostic(code(quarry::domain::wizard::normal_form))]
    MissingNormalForm,

    #[error("Cannot {action} from step {step}")]
    #[diagnostic(code(quarry::domain::wizard::transition))]
    InvalidTransition { action: &'static str, step: u8 },
}

impl DomainError {
    /// Errors that must block dispatch entirely.
    pub fn is_composition(&self) -> bool {
        !matches!(
            self,
            DomainError::MissingNormalForm | DomainError::InvalidTransition { .. }
        )
    }
}
