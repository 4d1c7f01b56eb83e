// quarry/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use quarry_core::domain::DataSourceKind;
use quarry_core::domain::request::OrderDirection;
use quarry_core::domain::wizard::NormalForm;

#[derive(Parser)]
#[command(name = "quarry")]
#[command(about = "Compose, dispatch and inspect queries against a remote database workspace", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory holding quarry.yaml
    #[arg(long, global = true, default_value = ".", env = "QUARRY_WORKSPACE_DIR")]
    pub workspace_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ⚡ Executes a raw query (SQL text or document filter), one statement per line
    Query {
        query: String,
    },

    /// 🧱 Builds an aggregation from discrete fields
    Visual(VisualArgs),

    /// 🔗 Runs a multi-stage aggregation pipeline in a single round trip
    Pipeline {
        /// YAML list of stages: `- { name?, query, selected? }`
        #[arg(long, short)]
        file: PathBuf,

        /// Collection the pipeline runs on
        #[arg(long, short)]
        collection: String,

        /// Only run stages marked `selected: true`
        #[arg(long)]
        selected: bool,

        /// Print the composed command instead of sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// 🧭 Shows the feature flags declared by the backend
    Capabilities,

    /// 📋 Lists the tables or collections of the database
    Targets,

    /// 🕘 Lists past queries of the configured database, newest first
    History {
        /// Only show queries containing this text (case-insensitive)
        #[arg(long)]
        search: Option<String>,

        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// List individual statements instead of whole queries
        #[arg(long)]
        commands: bool,
    },

    /// 🧩 Walks the normalization wizard end to end
    Normalize {
        /// Target normal form: 1NF | 2NF | 3NF | BCNF
        #[arg(long)]
        form: NormalForm,

        /// Answer to an analysis question, as key=value (repeatable)
        #[arg(long = "answer", value_parser = parse_answer)]
        answers: Vec<(String, String)>,
    },
}

#[derive(Args, Debug)]
pub struct VisualArgs {
    /// Table or collection to aggregate
    #[arg(long, short)]
    pub table: String,

    #[arg(long)]
    pub alias: Option<String>,

    /// Selected field or aggregate, e.g. `SUM(total)` (repeatable)
    #[arg(long = "select", short = 's')]
    pub select_fields: Vec<String>,

    #[arg(long)]
    pub group_by: Option<String>,

    #[arg(long)]
    pub order_by: Option<String>,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Table (relational) or collection (document) to join
    #[arg(long)]
    pub join: Option<String>,

    /// Join condition, for relational sources
    #[arg(long)]
    pub join_on: Option<String>,

    /// `localField=foreignField`, for document sources
    #[arg(long)]
    pub lookup: Option<String>,

    /// Data source kind used with --dry-run (otherwise read from quarry.yaml)
    #[arg(long)]
    pub kind: Option<DataSourceKind>,

    /// Print the composed request instead of sending it
    #[arg(long)]
    pub dry_run: bool,
}

impl VisualArgs {
    pub fn order_direction(&self) -> OrderDirection {
        if self.desc {
            OrderDirection::Desc
        } else {
            OrderDirection::Asc
        }
    }
}

fn parse_answer(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use clap::Parser;

    #[test]
    fn test_cli_parse_pipeline() -> Result<()> {
        let args = Cli::parse_from([
            "quarry",
            "pipeline",
            "--file",
            "stages.yaml",
            "--collection",
            "products",
            "--selected",
        ]);
        assert_eq!(args.workspace_dir.to_string_lossy(), ".");
        match args.command {
            Commands::Pipeline {
                file,
                collection,
                selected,
                dry_run,
            } => {
                assert_eq!(file.to_string_lossy(), "stages.yaml");
                assert_eq!(collection, "products");
                assert!(selected);
                assert!(!dry_run);
                Ok(())
            }
            _ => bail!("Expected Pipeline command"),
        }
    }

    #[test]
    fn test_cli_parse_visual() -> Result<()> {
        let args = Cli::parse_from([
            "quarry",
            "visual",
            "--table",
            "orders",
            "-s",
            "customer_id",
            "-s",
            "SUM(total)",
            "--group-by",
            "customer_id",
            "--desc",
            "--kind",
            "sql",
        ]);
        match args.command {
            Commands::Visual(v) => {
                assert_eq!(v.table, "orders");
                assert_eq!(v.select_fields, vec!["customer_id", "SUM(total)"]);
                assert_eq!(v.group_by.as_deref(), Some("customer_id"));
                assert_eq!(v.order_direction(), OrderDirection::Desc);
                assert_eq!(v.kind, Some(DataSourceKind::Relational));
                Ok(())
            }
            _ => bail!("Expected Visual command"),
        }
    }

    #[test]
    fn test_cli_parse_normalize_answers() -> Result<()> {
        let args = Cli::parse_from([
            "quarry",
            "--workspace-dir",
            "/tmp/ws",
            "normalize",
            "--form",
            "bcnf",
            "--answer",
            "pk=order_id",
            "--answer",
            "repeating_groups = no",
        ]);
        assert_eq!(args.workspace_dir.to_string_lossy(), "/tmp/ws");
        match args.command {
            Commands::Normalize { form, answers } => {
                assert_eq!(form, NormalForm::BoyceCodd);
                assert_eq!(
                    answers,
                    vec![
                        ("pk".to_string(), "order_id".to_string()),
                        ("repeating_groups".to_string(), "no".to_string())
                    ]
                );
                Ok(())
            }
            _ => bail!("Expected Normalize command"),
        }
    }

    #[test]
    fn test_cli_parse_history() -> Result<()> {
        let args = Cli::parse_from(["quarry", "history", "--search", "Users"]);
        match args.command {
            Commands::History {
                search,
                limit,
                commands,
            } => {
                assert_eq!(search.as_deref(), Some("Users"));
                assert_eq!(limit, 20);
                assert!(!commands);
                Ok(())
            }
            _ => bail!("Expected History command"),
        }
    }

    #[test]
    fn test_cli_rejects_malformed_answer() {
        let parsed = Cli::try_parse_from(["quarry", "normalize", "--form", "3NF", "--answer", "oops"]);
        assert!(parsed.is_err());
    }
}
