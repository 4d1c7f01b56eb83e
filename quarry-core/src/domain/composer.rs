// quarry-core/src/domain/composer.rs

use crate::domain::capabilities::DataSourceKind;
use crate::domain::error::DomainError;
use crate::domain::pipeline::{ExecutionScope, PipelineList, StageValidator, ValidatedPipeline};
use crate::domain::request::{ExecutionRequest, JoinSpec, PipelineCommand, VisualQuery};
use crate::domain::visual::{JoinForm, VisualBuilder};

/// Builds exactly one [`ExecutionRequest`] per execution. Pure: no IO, no state.
pub struct CommandComposer;

impl CommandComposer {
    /// Raw query text, sent verbatim.
    pub fn direct(raw_query: &str) -> Result<ExecutionRequest, DomainError> {
        if raw_query.trim().is_empty() {
            return Err(DomainError::EmptyQuery);
        }
        Ok(ExecutionRequest::Direct {
            raw_query: raw_query.to_string(),
        })
    }

    pub fn visual(
        builder: &VisualBuilder,
        kind: DataSourceKind,
    ) -> Result<ExecutionRequest, DomainError> {
        let table = builder.table.trim();
        if table.is_empty() {
            return Err(DomainError::MissingTable);
        }

        let select_fields = builder.effective_select_fields();
        if select_fields.is_empty() {
            return Err(DomainError::NoSelectFields);
        }

        Ok(ExecutionRequest::Visual(VisualQuery {
            table: table.to_string(),
            table_alias: non_blank(&builder.table_alias),
            select_fields,
            group_by: non_blank(&builder.group_by),
            order_by: non_blank(&builder.order_by),
            order_direction: builder.order_direction,
            join: join_spec(&builder.join, kind),
        }))
    }

    /// Validates the in-scope stages, then binds them to the target collection.
    ///
    /// All operations travel in one invocation so the backend never sees a
    /// partially applied pipeline.
    pub fn pipeline(
        list: &PipelineList,
        scope: ExecutionScope,
        collection: &str,
    ) -> Result<ExecutionRequest, DomainError> {
        let validated = StageValidator::validate_list(list, scope)?;
        Self::pipeline_from(validated, collection)
    }

    pub fn pipeline_from(
        validated: ValidatedPipeline,
        collection: &str,
    ) -> Result<ExecutionRequest, DomainError> {
        let target_collection = collection.trim();
        if target_collection.is_empty() {
            return Err(DomainError::MissingCollection);
        }
        if validated.operations.is_empty() {
            return Err(DomainError::EmptyScope);
        }

        Ok(ExecutionRequest::Pipeline(PipelineCommand {
            target_collection: target_collection.to_string(),
            operations: validated.operations,
            stage_names: validated.stage_names,
        }))
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn join_spec(form: &JoinForm, kind: DataSourceKind) -> Option<JoinSpec> {
    let table = non_blank(&form.table)?;
    match kind {
        DataSourceKind::Relational => Some(JoinSpec::Relational {
            join_type: form.join_type,
            alias: non_blank(&form.alias),
            on: form.on.trim().to_string(),
            table,
        }),
        DataSourceKind::Document => Some(JoinSpec::Lookup {
            local_field: form.local_field.trim().to_string(),
            foreign_field: form.foreign_field.trim().to_string(),
            as_field: non_blank(&form.as_field).unwrap_or_else(|| table.clone()),
            from: table,
        }),
    }
}
