// quarry/src/main.rs

mod cli;
mod commands;
mod render;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use quarry_core::QuarryError;
use quarry_core::domain::DomainError;
use quarry_core::infrastructure::error::InfrastructureError;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Setup Logging (Tracing)
    // RUST_LOG=debug quarry pipeline ... to see every dispatched request
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        report_failure(err);
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let workspace_dir = cli.workspace_dir;

    match cli.command {
        Commands::Query { query } => commands::query::execute(&workspace_dir, query).await,
        Commands::Visual(args) => commands::visual::execute(&workspace_dir, args).await,
        Commands::Pipeline {
            file,
            collection,
            selected,
            dry_run,
        } => {
            commands::pipeline::execute(&workspace_dir, file, collection, selected, dry_run).await
        }
        Commands::Capabilities => commands::capabilities::execute(&workspace_dir).await,
        Commands::Targets => commands::targets::execute(&workspace_dir).await,
        Commands::History {
            search,
            limit,
            commands,
        } => commands::history::execute(&workspace_dir, search, limit, commands),
        Commands::Normalize { form, answers } => {
            commands::normalize::execute(&workspace_dir, form, answers).await
        }
    }
}

/// Library errors are rendered as diagnostics (code + help); anything else as one line.
fn report_failure(err: anyhow::Error) {
    let err = match err.downcast::<QuarryError>() {
        Ok(QuarryError::Domain(e)) => return eprintln!("{:?}", miette::Report::new(e)),
        Ok(QuarryError::Infrastructure(e)) => return eprintln!("{:?}", miette::Report::new(e)),
        Ok(other) => return eprintln!("❌ {}", other),
        Err(err) => err,
    };
    let err = match err.downcast::<DomainError>() {
        Ok(e) => return eprintln!("{:?}", miette::Report::new(e)),
        Err(err) => err,
    };
    match err.downcast::<InfrastructureError>() {
        Ok(e) => eprintln!("{:?}", miette::Report::new(e)),
        Err(err) => eprintln!("❌ {:#}", err),
    }
}
