//! `foodshare` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve`     start the JSON API server.
//! - `migrate`   apply the bundled SQLite schema.
//! - `dashboard` print table counts and the newest listings.
//! - `reports`   list the report catalog.
//! - `report`    run one numbered report.
//! - `claims`    print claims joined with listing and receiver details.
//! - `table`     list, create, edit or delete rows of one table.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use crud::{CrudOrchestrator, Record, TableKind};
use db::{DataStore, DbConfig, ResultSet, Value};
use reports::{ReportId, ReportParams};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "foodshare",
    about = "Food donation dashboard: reports and record management",
    version
)]
struct Cli {
    /// Overrides the profile selected by ENVIRONMENT.
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the REST API server.
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080")]
        bind: String,
    },
    /// Apply the bundled schema to a local SQLite database.
    Migrate,
    /// Show table counts and the most recent listings.
    Dashboard,
    /// List the numbered reports.
    Reports,
    /// Run one report.
    Report {
        /// Report number, 1 to 13.
        number: u8,
        /// City for the provider-contacts report.
        #[arg(long, default_value = reports::catalog::DEFAULT_CITY)]
        city: String,
        /// Zero-based page of the provider-contacts report.
        #[arg(long, default_value_t = 0)]
        page: u32,
        /// Print every row instead of one page.
        #[arg(long)]
        all: bool,
        /// Print CSV instead of a table.
        #[arg(long)]
        csv: bool,
    },
    /// Claims with food and receiver details.
    Claims,
    /// Manage rows of Providers, Receivers, Food_Listings_Dataset or Claims.
    Table {
        table: TableKind,
        #[command(subcommand)]
        action: TableAction,
    },
}

#[derive(Subcommand)]
enum TableAction {
    /// Print every row.
    List {
        #[arg(long)]
        csv: bool,
    },
    /// Show the editable fields of one row.
    Form { id: i64 },
    /// Insert a row from `--set Field=value` pairs.
    Create {
        #[arg(long = "set", value_parser = parse_assignment)]
        fields: Vec<(String, String)>,
    },
    /// Change fields of one row.
    Update {
        id: i64,
        #[arg(long = "set", value_parser = parse_assignment)]
        fields: Vec<(String, String)>,
    },
    /// Remove one row.
    Delete { id: i64 },
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_owned(), value.to_owned()))
        }
        _ => Err(format!("expected Field=value, got '{s}'")),
    }
}

fn to_record(fields: Vec<(String, String)>) -> Record {
    fields
        .into_iter()
        .map(|(field, value)| (field, Value::Text(value)))
        .collect()
}

fn print_table(set: &ResultSet, csv: bool) {
    if csv {
        print!("{}", set.to_csv());
    } else {
        println!("{set}");
    }
}

fn print_warning(store: &DataStore) {
    if let Some(warning) = store.last_error() {
        eprintln!("warning: {warning}");
    }
}

/// Connect, applying the bundled schema first when the target is local.
async fn open_store(config: &DbConfig) -> DataStore {
    let store = DataStore::connect(config).await;
    if config.is_local() {
        if let Some(pool) = store.pool() {
            if let Err(e) = db::pool::run_migrations(pool).await {
                warn!("could not apply local schema: {e}");
            }
        }
    }
    store
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = DbConfig::from_env().context("invalid database configuration")?;
    if let Some(url) = cli.database_url {
        config.url_override = Some(url);
    }

    match cli.command {
        Command::Serve { bind } => {
            let state = api::AppState::new(open_store(&config).await).await;
            info!("Starting API server on {bind}");
            api::serve(&bind, state).await?;
        }
        Command::Migrate => {
            if !config.is_local() {
                bail!("the bundled schema targets SQLite; provision remote databases separately");
            }
            let pool = db::pool::create_pool(&config)
                .await
                .context("failed to connect to database")?;
            db::pool::run_migrations(&pool)
                .await
                .context("migration failed")?;
            info!("Migrations applied successfully");
        }
        Command::Dashboard => {
            let store = open_store(&config).await;
            let counts = reports::insights::dashboard_summary(&store).await;
            println!(
                "Providers: {}  Receivers: {}  Listings: {}  Claims: {}\n",
                counts.providers, counts.receivers, counts.listings, counts.claims
            );
            let recent =
                reports::insights::recent_listings(&store, reports::insights::RECENT_LISTINGS)
                    .await;
            println!("Recent listings\n{recent}");
            print_warning(&store);
        }
        Command::Reports => {
            for entry in reports::catalog() {
                let marker = if entry.takes_city { " [--city]" } else { "" };
                println!("{:>2}. {}{marker}", entry.number, entry.title);
            }
        }
        Command::Report {
            number,
            city,
            page,
            all,
            csv,
        } => {
            let id = ReportId::try_from(number)?;
            let mut params = ReportParams::for_city(city).page(page);
            if all {
                params = params.unpaginated();
            }
            let store = open_store(&config).await;
            let output = reports::run_report(&store, id, &params).await?;
            if !csv {
                println!("{}. {}", id.number(), output.title);
            }
            print_table(&output.table, csv);
            if let (false, Some(hint)) = (csv, &output.chart) {
                println!(
                    "chart: {:?} of {} by {}",
                    hint.kind, hint.value_column, hint.label_column
                );
            }
            print_warning(&store);
        }
        Command::Claims => {
            let store = open_store(&config).await;
            let schema = reports::ClaimsSchema::probe(&store).await;
            let detail = reports::claims_with_details(&store, &schema).await;
            if let Some(warning) = &detail.warning {
                eprintln!("warning: {warning}");
            }
            println!("{}", detail.table);
            print_warning(&store);
        }
        Command::Table { table, action } => {
            let store = open_store(&config).await;
            let crud = CrudOrchestrator::new(&store);
            let outcome = match action {
                TableAction::List { csv } => {
                    print_table(&crud.read(table).await, csv);
                    Ok(())
                }
                TableAction::Form { id } => crud.edit_form(table, Some(id)).await.map(|form| {
                    println!("{table} {} = {}", form.id_column, form.id);
                    for field in &form.fields {
                        println!(
                            "  {:<14} {:<20} ({})",
                            field.spec.name,
                            field.current,
                            crud::orchestrator::field_hint(&field.spec)
                        );
                    }
                }),
                TableAction::Create { fields } => crud
                    .create(table, &to_record(fields))
                    .await
                    .map(|()| println!("Added to {table}.")),
                TableAction::Update { id, fields } => crud
                    .update(table, Some(id), &to_record(fields))
                    .await
                    .map(|()| println!("Updated {table} {id}.")),
                TableAction::Delete { id } => crud
                    .delete(table, Some(id))
                    .await
                    .map(|()| println!("Deleted {table} {id}.")),
            };
            if let Err(e) = outcome {
                print_warning(&store);
                bail!("{table}: {e}");
            }
        }
    }

    Ok(())
}
