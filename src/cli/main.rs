//! CLI binary entry point for opendata-pg

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use opendata_pg::PostgresStore;
use opendata_pg::config::{ENV_API_KEY, ENV_CATEGORY, ENV_DATABASE_URL, ImporterConfig};
use opendata_pg::importer::{DatasetImporter, build_inventory};
use opendata_pg::report;
use opendata_pg::source::{HttpDatasetSource, KeywordFilter};

#[derive(Parser)]
#[command(name = "opendata-pg")]
#[command(about = "Import open geospatial dataset feeds into PostgreSQL/PostGIS")]
#[command(version)]
struct Cli {
    /// Dataset category id to discover
    #[arg(long, env = ENV_CATEGORY)]
    category: Option<i64>,

    /// Keyword pattern for dataset name filtering (case-insensitive regex)
    #[arg(long)]
    keywords: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the inventory report of the target datasets
    Report {
        /// Output file path
        #[arg(short, long, default_value = report::DEFAULT_REPORT_FILE)]
        output: PathBuf,
    },
    /// Provision a table per target dataset and bulk load its features
    Import {
        /// Also write the inventory report before importing
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ImporterConfig::from_env()
        .with_context(|| format!("configuration (is {ENV_API_KEY} set?)"))?;
    if let Some(category) = cli.category {
        config.category = category;
    }
    if let Some(keywords) = &cli.keywords {
        config.keyword_pattern = keywords.clone();
    }

    let source =
        HttpDatasetSource::new(&config.base_url, &config.api_key, config.request_timeout)?;
    let filter = KeywordFilter::new(&config.keyword_pattern)?;

    match cli.command {
        Commands::Report { output } => {
            let entries = build_inventory(&source, &filter, config.category).await?;
            report::write_to_file(&output, &entries)
                .with_context(|| format!("writing report to {}", output.display()))?;
            println!("wrote {} dataset(s) to {}", entries.len(), output.display());
        }
        Commands::Import { report: report_path } => {
            let store = PostgresStore::connect(&config.database_url)
                .await
                .with_context(|| format!("connecting via {ENV_DATABASE_URL}"))?;
            let importer = DatasetImporter::new(source, store, filter, config.category);

            if let Some(path) = report_path {
                let entries = importer.inventory().await?;
                report::write_to_file(&path, &entries)
                    .with_context(|| format!("writing report to {}", path.display()))?;
            }

            let summary = importer.run().await?;
            println!(
                "imported {} dataset(s), {} row(s), {} failure(s)",
                summary.imported.len(),
                summary.total_rows(),
                summary.failed.len()
            );
            for failed in &summary.failed {
                eprintln!("dataset {}: {}", failed.dataset_id, failed.error);
            }
            if !summary.is_success() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
