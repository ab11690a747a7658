use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};

use bqflatten::bigquery::{BigQueryOps, BigQueryRestClient, ViewMaterializer};
use bqflatten::config::Settings;
use bqflatten::schema::{DatasetRef, TableRef};
use bqflatten::view_generator::{self, ReservedWords};

/// bqflatten - Flatten nested BigQuery tables into joinable views
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Flatten a nested table into one view per nesting lineage
    Create {
        /// GCP project where the table is stored
        project: String,

        /// BigQuery dataset where the table is stored
        dataset: String,

        /// BigQuery table to be flattened
        table: String,

        /// Root table primary key
        primary_key: String,

        /// Print the compiled SQL instead of creating any views
        #[arg(long)]
        dry_run: bool,

        /// File with one reserved keyword per line (replaces the embedded
        /// BigQuery list)
        #[arg(long)]
        keywords_file: Option<PathBuf>,
    },
    /// Delete every generated (vw_-prefixed) view in a dataset
    Cleanup {
        /// GCP project where the dataset is stored
        project: String,

        /// BigQuery dataset to clean up
        dataset: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    // Initialize logger - defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli.command).await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Create {
            project,
            dataset,
            table,
            primary_key,
            dry_run,
            keywords_file,
        } => {
            let keywords = load_keywords(keywords_file.as_deref())?;
            let table = TableRef::new(project, dataset, table);
            let settings = Settings::from_env()?;
            let client = BigQueryRestClient::new(&settings);

            log::info!("Fetching schema for {}", table);
            let fields = client.fetch_schema(&table).await?;
            let views = view_generator::compile(&fields, &table, &primary_key, &keywords)?;
            log::info!("Compiled {} view(s) for {}", views.len(), table);

            if dry_run {
                for view in &views {
                    println!("-- {}\n{}\n", view.view_name, view.sql);
                }
                return Ok(());
            }

            let materializer = ViewMaterializer::new(&client);
            let outcomes = materializer.materialize(&table.dataset_ref(), &views).await;
            let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
            if failed > 0 {
                anyhow::bail!("{} of {} views failed to create", failed, outcomes.len());
            }
            Ok(())
        }
        Command::Cleanup { project, dataset } => {
            let settings = Settings::from_env()?;
            let client = BigQueryRestClient::new(&settings);
            let materializer = ViewMaterializer::new(&client);

            let dataset = DatasetRef::new(project, dataset);
            let outcomes = materializer.cleanup(&dataset).await?;
            let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
            log::info!(
                "Deleted {} view(s) from {}",
                outcomes.len() - failed,
                dataset
            );
            if failed > 0 {
                anyhow::bail!("{} of {} views failed to delete", failed, outcomes.len());
            }
            Ok(())
        }
    }
}

fn load_keywords(path: Option<&std::path::Path>) -> anyhow::Result<ReservedWords> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read keywords file {}", path.display()))?;
            Ok(ReservedWords::from_words(
                content
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty()),
            ))
        }
        None => Ok(ReservedWords::bigquery()),
    }
}
