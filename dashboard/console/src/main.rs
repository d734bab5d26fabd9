//! Chanda console: entry point.
//!
//! Loads `.env` and the environment configuration, restores the saved login
//! session from SQLite, then runs one subcommand against the REST backend.

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use chanda_console::api::ApiClient;
use chanda_console::commands::{
    self, collect::CollectArgs, contributors::ContributorCommands, expenses::ExpenseCommands,
    Context,
};
use chanda_console::config::Config;
use chanda_console::errors::Result;
use chanda_console::output::{self, OutputFormat};
use chanda_console::session::SessionStore;

/// Chanda collection console
#[derive(Parser)]
#[command(name = "chanda")]
#[command(about = "Record and review Chanda contributions, pledges and expenses", long_about = None)]
#[command(version)]
struct Cli {
    /// Chanda backend URL
    #[arg(long, env = "CHANDA_API_URL")]
    api_url: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table")]
    output: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and remember the access token
    Login {
        username: String,

        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Forget the saved access token
    Logout,

    /// List Tolas
    Tolas,

    /// Browse and edit contributors
    Contributors {
        #[command(subcommand)]
        command: ContributorCommands,
    },

    /// Record a contribution
    Collect(CollectArgs),

    /// Browse recorded contributions
    Contributions {
        /// Filter by contributor, Tola or receipt ID
        #[arg(short, long, default_value = "")]
        search: String,

        /// Page number
        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// Pledged vs. paid for one Tola
    Payments {
        /// Tola id or name
        tola: String,

        /// Filter by contributor name
        #[arg(short, long, default_value = "")]
        search: String,

        /// Page number
        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// Manage expenses
    Expenses {
        #[command(subcommand)]
        command: ExpenseCommands,
    },

    /// Collection summary
    Dashboard,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logs go to stderr so tables and JSON on stdout stay clean.
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    if let Err(e) = run(cli).await {
        output::report_error(&e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::from_env()?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    debug!("Using backend {}", config.api_url);

    let store = SessionStore::open(&config.session_db).await?;
    let session = store.load().await?;
    let api = ApiClient::from_config(&config, session)?;

    let mut ctx = Context {
        config,
        api,
        store,
        format: cli.output,
    };

    match cli.command {
        Commands::Login { username, password } => {
            commands::auth::login(&mut ctx, username, password).await
        }
        Commands::Logout => commands::auth::logout(&mut ctx).await,
        Commands::Tolas => commands::tolas::execute(&ctx).await,
        Commands::Contributors { command } => commands::contributors::execute(command, &ctx).await,
        Commands::Collect(args) => commands::collect::execute(args, &ctx).await,
        Commands::Contributions { search, page } => {
            commands::contributions::execute(&ctx, search, page).await
        }
        Commands::Payments { tola, search, page } => {
            commands::payments::execute(&ctx, tola, search, page).await
        }
        Commands::Expenses { command } => commands::expenses::execute(command, &ctx).await,
        Commands::Dashboard => commands::dashboard::execute(&ctx).await,
    }
}
