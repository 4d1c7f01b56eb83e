// quarry-core/src/application/normalization.rs

use tracing::info;

use crate::domain::wizard::NormalizationWizard;
use crate::error::QuarryError;
use crate::ports::backend::QueryBackend;

/// Fetches the backend analysis and moves the wizard from step 1 to 2.
///
/// Refuses locally, with no round trip, when no normal form was chosen.
pub async fn run_analysis(
    backend: &dyn QueryBackend,
    wizard: &mut NormalizationWizard,
) -> Result<(), QuarryError> {
    wizard.ready_for_analysis()?;

    info!("🔍 Requesting normalization analysis...");
    let analysis = backend.analyze_for_normalization().await?;
    wizard.analysis_loaded(analysis)?;
    Ok(())
}

/// Sends the answers with the analysis and moves the wizard from step 3 to 4.
pub async fn run_normalization(
    backend: &dyn QueryBackend,
    wizard: &mut NormalizationWizard,
) -> Result<(), QuarryError> {
    let body = wizard.normalize_request()?;

    info!(normal_form = %body["normal_form"], "🧩 Normalizing schema...");
    let outcome = backend.normalize(&body).await?;
    info!(new_tables = outcome.new_tables.len(), "✅ Normalization finished");

    wizard.normalization_finished(outcome)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::RecordingBackend;
    use crate::domain::error::DomainError;
    use crate::domain::wizard::{NormalForm, WizardStep};
    use anyhow::Result;
    use serde_json::json;

    #[tokio::test]
    async fn test_analysis_without_form_stays_local() {
        let backend = RecordingBackend::new();
        let mut wizard = NormalizationWizard::new();

        let err = run_analysis(&backend, &mut wizard).await;
        assert!(matches!(
            err,
            Err(QuarryError::Domain(DomainError::MissingNormalForm))
        ));
        assert_eq!(backend.analysis_calls(), 0);
        assert_eq!(wizard.step(), WizardStep::ChooseForm);
    }

    #[tokio::test]
    async fn test_full_round_trip() -> Result<()> {
        let backend = RecordingBackend::new()
            .reply(json!({"tables": [{"name": "orders"}], "questions": ["pk?"]}))
            .reply(json!({
                "success": true,
                "message": "Normalized to 2NF",
                "changes": ["moved customer_name to customers"],
                "new_tables": [{"name": "customers", "columns": ["id", "name"]}]
            }));
        let mut wizard = NormalizationWizard::new();
        wizard.select_normal_form(NormalForm::Second)?;

        run_analysis(&backend, &mut wizard).await?;
        assert_eq!(wizard.step(), WizardStep::ReviewAnalysis);
        assert_eq!(backend.analysis_calls(), 1);

        wizard.proceed()?;
        wizard.set_answer("pk", "order_id")?;
        run_normalization(&backend, &mut wizard).await?;

        assert_eq!(wizard.step(), WizardStep::Done);
        let outcome = wizard.result().map(|r| r.new_tables.len());
        assert_eq!(outcome, Some(1));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_analysis_keeps_step() -> Result<()> {
        let backend = RecordingBackend::new().fail("analysis unavailable");
        let mut wizard = NormalizationWizard::new();
        wizard.select_normal_form(NormalForm::BoyceCodd)?;

        let err = run_analysis(&backend, &mut wizard).await;
        assert!(err.is_err());
        assert_eq!(wizard.step(), WizardStep::ChooseForm);
        assert_eq!(wizard.normal_form(), Some(NormalForm::BoyceCodd));
        Ok(())
    }
}
