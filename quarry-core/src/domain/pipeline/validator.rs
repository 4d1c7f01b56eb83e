// quarry-core/src/domain/pipeline/validator.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::list::PipelineList;
use super::stage::Stage;
use crate::domain::error::DomainError;

/// Which stages an execution covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionScope {
    #[default]
    All,
    Selected,
}

/// Parsed operations of the in-scope stages, in list order.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPipeline {
    pub stage_names: Vec<String>,
    pub operations: Vec<Value>,
}

impl ValidatedPipeline {
    pub fn stage_count(&self) -> usize {
        self.operations.len()
    }
}

pub struct StageValidator;

impl StageValidator {
    /// Resolves the scope, then validates and parses the stages it covers.
    pub fn validate_list(
        list: &PipelineList,
        scope: ExecutionScope,
    ) -> Result<ValidatedPipeline, DomainError> {
        Self::validate(&list.in_scope(scope))
    }

    /// Checks run in this order:
    /// 1. the scope is not empty,
    /// 2. no stage is blank (every blank stage is reported at once),
    /// 3. each stage parses as a JSON document, left to right, stopping at the first failure.
    pub fn validate(stages: &[&Stage]) -> Result<ValidatedPipeline, DomainError> {
        if stages.is_empty() {
            return Err(DomainError::EmptyScope);
        }

        let blank: Vec<String> = stages
            .iter()
            .filter(|s| s.is_blank())
            .map(|s| s.name.clone())
            .collect();
        if !blank.is_empty() {
            return Err(DomainError::BlankStages(blank));
        }

        let mut operations = Vec::with_capacity(stages.len());
        for stage in stages {
            let op: Value =
                serde_json::from_str(stage.query.trim()).map_err(|e| DomainError::StageParse {
                    stage: stage.name.clone(),
                    message: e.to_string(),
                })?;
            operations.push(op);
        }

        Ok(ValidatedPipeline {
            stage_names: stages.iter().map(|s| s.name.clone()).collect(),
            operations,
        })
    }
}
