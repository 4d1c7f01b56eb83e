// quarry/src/commands/normalize.rs
//
// USE CASE: Walk the normalization wizard in one go (choose, analyze, answer, apply).

use comfy_table::Table;
use std::path::Path;

use quarry_core::application::{run_analysis, run_normalization};
use quarry_core::domain::wizard::{NormalForm, NormalizationOutcome, NormalizationWizard};

use super::connect;

pub async fn execute(
    workspace_dir: &Path,
    form: NormalForm,
    answers: Vec<(String, String)>,
) -> anyhow::Result<()> {
    let conn = connect(workspace_dir)?;
    let mut wizard = NormalizationWizard::new();

    println!("🧩 Target: {} ({})", form.label(), form.description());
    wizard.select_normal_form(form)?;

    run_analysis(&conn.backend, &mut wizard).await?;
    if let Some(analysis) = wizard.analysis() {
        println!("📊 Analysis:\n{}", serde_yaml::to_string(analysis)?);
    }

    wizard.proceed()?;
    for (key, value) in answers {
        wizard.set_answer(key, value)?;
    }

    run_normalization(&conn.backend, &mut wizard).await?;
    if let Some(outcome) = wizard.result() {
        print_outcome(outcome);
    }
    Ok(())
}

fn print_outcome(outcome: &NormalizationOutcome) {
    println!(
        "✨ {}",
        outcome.message.as_deref().unwrap_or("Normalization completed")
    );
    for change in &outcome.changes {
        println!("   ➜ {}", change);
    }
    if !outcome.new_tables.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["New table", "Columns"]);
        for t in &outcome.new_tables {
            table.add_row(vec![t.name.clone(), t.columns.join(", ")]);
        }
        println!("{}", table);
    }
}
