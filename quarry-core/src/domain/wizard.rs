// quarry-core/src/domain/wizard.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NormalForm {
    #[serde(rename = "1NF")]
    First,
    #[serde(rename = "2NF")]
    Second,
    #[serde(rename = "3NF")]
    Third,
    #[serde(rename = "BCNF")]
    BoyceCodd,
}

impl NormalForm {
    pub const ALL: [NormalForm; 4] = [Self::First, Self::Second, Self::Third, Self::BoyceCodd];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::First => "1NF",
            Self::Second => "2NF",
            Self::Third => "3NF",
            Self::BoyceCodd => "BCNF",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::First => "First Normal Form (1NF)",
            Self::Second => "Second Normal Form (2NF)",
            Self::Third => "Third Normal Form (3NF)",
            Self::BoyceCodd => "Boyce-Codd Normal Form (BCNF)",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::First => "Eliminate repeating groups",
            Self::Second => "Remove partial dependencies",
            Self::Third => "Remove transitive dependencies",
            Self::BoyceCodd => "Stricter version of 3NF",
        }
    }
}

impl fmt::Display for NormalForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NormalForm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "1NF" => Ok(Self::First),
            "2NF" => Ok(Self::Second),
            "3NF" => Ok(Self::Third),
            "BCNF" => Ok(Self::BoyceCodd),
            _ => Err(format!("Unknown normal form: {}", s)),
        }
    }
}

/// Wizard steps, numbered 1 to 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum WizardStep {
    #[default]
    ChooseForm = 1,
    ReviewAnalysis = 2,
    Questions = 3,
    Done = 4,
}

impl WizardStep {
    pub fn number(&self) -> u8 {
        *self as u8
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTable {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<String>,
}

/// What the backend reports once normalization ran.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationOutcome {
    pub message: Option<String>,
    pub changes: Vec<String>,
    pub new_tables: Vec<NewTable>,
}

/// Four-step normalization workflow. Moves one step at a time, except
/// [`NormalizationWizard::start_new`] which resets everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizationWizard {
    step: WizardStep,
    normal_form: Option<NormalForm>,
    analysis: Option<Value>,
    answers: Map<String, Value>,
    result: Option<NormalizationOutcome>,
}

impl NormalizationWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn normal_form(&self) -> Option<NormalForm> {
        self.normal_form
    }

    pub fn analysis(&self) -> Option<&Value> {
        self.analysis.as_ref()
    }

    pub fn answers(&self) -> &Map<String, Value> {
        &self.answers
    }

    pub fn result(&self) -> Option<&NormalizationOutcome> {
        self.result.as_ref()
    }

    fn expect_step(&self, expected: WizardStep, action: &'static str) -> Result<(), DomainError> {
        if self.step != expected {
            return Err(DomainError::InvalidTransition {
                action,
                step: self.step.number(),
            });
        }
        Ok(())
    }

    pub fn select_normal_form(&mut self, form: NormalForm) -> Result<(), DomainError> {
        self.expect_step(WizardStep::ChooseForm, "choose a normal form")?;
        self.normal_form = Some(form);
        Ok(())
    }

    /// Whether the analysis may be requested: step 1 with a normal form chosen.
    pub fn ready_for_analysis(&self) -> Result<(), DomainError> {
        self.expect_step(WizardStep::ChooseForm, "load an analysis")?;
        if self.normal_form.is_none() {
            return Err(DomainError::MissingNormalForm);
        }
        Ok(())
    }

    /// Step 1 -> 2, once the backend analysis arrived.
    pub fn analysis_loaded(&mut self, analysis: Value) -> Result<(), DomainError> {
        self.ready_for_analysis()?;
        self.analysis = Some(analysis);
        self.step = WizardStep::ReviewAnalysis;
        Ok(())
    }

    /// Step 2 -> 3.
    pub fn proceed(&mut self) -> Result<(), DomainError> {
        self.expect_step(WizardStep::ReviewAnalysis, "proceed to questions")?;
        self.step = WizardStep::Questions;
        Ok(())
    }

    /// Step 2 -> 1 or 3 -> 2. Nothing else is cleared.
    pub fn back(&mut self) -> Result<(), DomainError> {
        self.step = match self.step {
            WizardStep::ReviewAnalysis => WizardStep::ChooseForm,
            WizardStep::Questions => WizardStep::ReviewAnalysis,
            other => {
                return Err(DomainError::InvalidTransition {
                    action: "go back",
                    step: other.number(),
                });
            }
        };
        Ok(())
    }

    pub fn set_answer(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), DomainError> {
        self.expect_step(WizardStep::Questions, "answer questions")?;
        self.answers.insert(key.into(), Value::String(value.into()));
        Ok(())
    }

    /// Body of the normalize call: the analysis with the answers folded in.
    pub fn normalize_request(&self) -> Result<Value, DomainError> {
        self.expect_step(WizardStep::Questions, "normalize")?;
        let form = self.normal_form.ok_or(DomainError::MissingNormalForm)?;

        let mut analysis_data = match &self.analysis {
            Some(Value::Object(obj)) => obj.clone(),
            _ => Map::new(),
        };
        analysis_data.insert("user_answers".into(), Value::Object(self.answers.clone()));

        Ok(json!({
            "normal_form": form.as_str(),
            "analysis_data": analysis_data,
        }))
    }

    /// Step 3 -> 4.
    pub fn normalization_finished(
        &mut self,
        outcome: NormalizationOutcome,
    ) -> Result<(), DomainError> {
        self.expect_step(WizardStep::Questions, "finish normalization")?;
        self.result = Some(outcome);
        self.step = WizardStep::Done;
        Ok(())
    }

    /// Terminal action: every field back to its initial value.
    pub fn start_new(&mut self) -> Result<(), DomainError> {
        self.expect_step(WizardStep::Done, "start a new normalization")?;
        *self = Self::default();
        Ok(())
    }
}
