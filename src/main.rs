//! Botledger CLI - manage the company, chatbot and LLM registry

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use botledger::config::{self, BotledgerConfig};
use botledger::import::{CsvImporter, PathSource};
use botledger::storage::{RecordStore, SqliteStore};
use botledger::ui::{self, Icons, Spinner};
use botledger::users::{UserService, DEFAULT_PASSWORD};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "botledger")]
#[command(version = "0.1.0")]
#[command(about = "Registry of companies and the chatbots and LLMs they own")]
#[command(long_about = r#"
Botledger keeps users, companies, chatbots and LLMs in a SQLite database:
  • Bulk import from a CSV file
  • Password login with idle-expiring sessions
  • A JSON API for dashboards and admin tooling

Example usage:
  botledger init
  botledger import --csv files/import.csv
  botledger serve --port 8080
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only print results and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the config file (defaults to ./botledger.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides the config)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the JSON API server
    Serve {
        /// Port to listen on (overrides the config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Import companies, chatbots and LLMs from a CSV file
    Import {
        /// CSV file to read (overrides the config)
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Remove all companies, chatbots and LLMs
    Clear,

    /// Show record counts
    Stats,

    /// List companies with their chatbots and LLMs
    Companies {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List active users
    Users,

    /// Seed the default accounts
    Seed {
        /// Delete all users first
        #[arg(long)]
        reset: bool,
    },

    /// Write a botledger.toml with the defaults
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    botledger::output::init_quiet(cli.quiet);

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);

    if let Commands::Init { force } = cli.command {
        let defaults = BotledgerConfig::with_defaults();
        config::write_config(&config_path, &defaults, force)?;
        config::ensure_db_dir(&defaults.database_path())?;
        ui::success(&format!("Wrote {}", config_path.display()));
        return Ok(());
    }

    let mut settings = config::load_config(Some(&config_path))?.unwrap_or_default();
    if let Some(database) = &cli.database {
        settings.database = Some(database.display().to_string());
    }
    let database = settings.database_path();
    config::ensure_db_dir(&database)?;

    match cli.command {
        Commands::Init { .. } => {}

        Commands::Serve { port } => {
            let port = port.unwrap_or_else(|| settings.port());
            let store = SqliteStore::open(&database)?;
            UserService::new(&store).seed_default_users()?;
            drop(store);

            ui::header("Starting Botledger API");
            ui::info(Icons::DATABASE, "Database", &database.display().to_string());
            ui::info(Icons::FILE, "CSV source", &settings.csv_path().display().to_string());
            botledger::server::start_server(port, &settings).await?;
        }

        Commands::Import { csv } => {
            let csv = csv.unwrap_or_else(|| settings.csv_path());
            let mut store = SqliteStore::open(&database)?;
            UserService::new(&store).seed_default_users()?;

            ui::header("Importing CSV data");
            ui::info(Icons::FILE, "Source", &csv.display().to_string());
            ui::info(Icons::DATABASE, "Database", &database.display().to_string());

            let spinner = Spinner::new("Importing...");
            let result = CsvImporter::new(&mut store, PathSource::new(&csv)).import();
            spinner.finish_and_clear();

            if !result.success {
                ui::error(&result.message);
                std::process::exit(1);
            }
            ui::success(&result.message);
            ui::section("Totals");
            ui::summary_row(&format!("{} Companies", Icons::BUILDING), &result.companies_imported.to_string());
            ui::summary_row(&format!("{} Chatbots", Icons::ROBOT), &result.chatbots_imported.to_string());
            ui::summary_row(&format!("{} LLMs", Icons::BRAIN), &result.llms_imported.to_string());
        }

        Commands::Clear => {
            let mut store = SqliteStore::open(&database)?;
            let before = store.stats()?;
            store.clear_all()?;
            ui::success(&format!(
                "{} Cleared {} companies, {} chatbots and {} LLMs",
                Icons::DEL,
                before.companies,
                before.chatbots,
                before.llms
            ));
        }

        Commands::Stats => {
            let store = SqliteStore::open(&database)?;
            let stats = store.stats()?;

            println!("{} Botledger Statistics ({})", Icons::STATS, database.display());
            println!(
                "{}",
                ui::stats_table(&[
                    ("Users", stats.users.to_string().as_str()),
                    ("Companies", stats.companies.to_string().as_str()),
                    ("Chatbots", stats.chatbots.to_string().as_str()),
                    ("LLMs", stats.llms.to_string().as_str()),
                ])
            );
        }

        Commands::Companies { json } => {
            let store = SqliteStore::open(&database)?;
            let companies = store.list_companies_with_children()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&companies)?);
            } else if companies.is_empty() {
                ui::warn("No companies found. Run `botledger import` first.");
            } else {
                println!("{}", ui::company_table(&companies));
            }
        }

        Commands::Users => {
            let store = SqliteStore::open(&database)?;
            let users = UserService::new(&store).list_active_users()?;
            if users.is_empty() {
                ui::warn("No active users. Run `botledger seed` to add the default accounts.");
            } else {
                println!("{}", ui::user_table(&users));
            }
        }

        Commands::Seed { reset } => {
            let store = SqliteStore::open(&database)?;
            let service = UserService::new(&store);
            let added = if reset {
                service.reseed_default_users()?
            } else {
                service.seed_default_users()?
            };

            if added == 0 {
                ui::info(Icons::PERSON, "Users", "already present, nothing to seed");
            } else {
                ui::success(&format!("Seeded {} users", added));
                println!("{}", ui::dim(&format!("  default password: {}", DEFAULT_PASSWORD)));
            }
        }
    }

    Ok(())
}
