//! Clan Inspector CLI - keeps a local record of a Destiny 2 clan's activities.

mod commands;
mod config;
mod progress;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::Term;
use tracing_subscriber::EnvFilter;

use crate::commands::report::ReportAction;
use crate::commands::shared::OutputFormat;

#[derive(Parser)]
#[command(name = "clan-inspector")]
#[command(version)]
#[command(about = "Incremental activity sync for a Destiny 2 clan")]
#[command(
    long_about = "Clan Inspector mirrors a clan's roster and post-game carnage reports from \
the Bungie.net API into a local database. Each character keeps a watermark, so repeated \
runs only fetch activities played since the last sync."
)]
#[command(after_long_help = r#"EXAMPLES
    Refresh members and characters from the clan roster:
        $ clan-inspector roster

    Fetch new activities for every tracked character:
        $ clan-inspector sync

    Build the co-play graph for January:
        $ clan-inspector report social --from 2025-01-01 --to 2025-02-01 --out social.json

    Generate shell completions:
        $ clan-inspector completions bash > ~/.local/share/bash-completion/completions/clan-inspector

CONFIGURATION
    Clan Inspector reads configuration from:
      1. ~/.config/clan-inspector/config.toml (or $XDG_CONFIG_HOME/clan-inspector/config.toml)
      2. ./clan-inspector.toml, then ./ClanInspector.yaml
      3. Environment variables (CLAN_INSPECTOR_ prefix, '__' between section and key)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    CLAN_INSPECTOR_DATABASE__URL          Database connection string (default: ~/.local/state/clan-inspector/clan-inspector.db)
    CLAN_INSPECTOR_BUNGIE__API_KEY        Bungie.net application API key
    CLAN_INSPECTOR_BUNGIE__CLAN_ID        Clan (group) id
    CLAN_INSPECTOR_BUNGIE__MEMBERSHIP_TYPE  Platform membership type (default: 4)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Refresh clan members and their characters
    Roster {
        /// Disable proactive rate limiting (may cause API throttling)
        #[arg(short = 'R', long)]
        no_rate_limit: bool,
    },
    /// Fetch new activities for every tracked character
    Sync {
        /// Skip characters played within this many hours of their last sync
        #[arg(short = 'a', long)]
        age_cutoff_hours: Option<i64>,

        /// Read at most this many history pages per character; a character cut
        /// short keeps its watermark until a later run reaches it
        #[arg(short = 'p', long)]
        page_limit: Option<u32>,

        /// Disable proactive rate limiting (may cause API throttling)
        #[arg(short = 'R', long)]
        no_rate_limit: bool,
    },
    /// Re-fetch stored activities that were saved without participants
    Repair {
        /// Stored activities read per batch
        #[arg(short, long, default_value_t = clan_inspector::repair::DEFAULT_REPAIR_BATCH_SIZE)]
        batch_size: u64,

        /// Disable proactive rate limiting (may cause API throttling)
        #[arg(short = 'R', long)]
        no_rate_limit: bool,
    },
    /// Build reports from stored activities
    Report {
        #[command(subcommand)]
        action: ReportAction,
    },
    /// Show tracked characters and their sync state
    Status {
        /// Override the configured age cutoff when computing the due column
        #[arg(short = 'a', long)]
        age_cutoff_hours: Option<i64>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Generate man page(s)
    Man {
        /// Output directory for man pages (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Rollback the last migration
    Down,
    /// Show migration status
    Status,
    /// Drop all tables and reapply migrations
    Fresh,
}

/// Make sure the directory holding a SQLite database file exists.
fn ensure_sqlite_dir(database_url: &str) -> std::io::Result<()> {
    let Some(db_path) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let db_path = db_path.split('?').next().unwrap_or(db_path);
    let db_path = std::path::Path::new(db_path);

    if db_path.is_relative() && !db_path.as_os_str().is_empty() {
        tracing::warn!(
            "Database path '{}' is relative - behavior depends on current directory.",
            db_path.display()
        );
    }

    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    shutdown::setup_shutdown_handler();

    // Structured logs only when nobody is watching the progress bars
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("clan_inspector=info,clan_inspector_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let config = config::Config::load();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Completions { shell } => {
            commands::meta::handle_completions(*shell)?;
            return Ok(());
        }
        Commands::Man { output } => {
            commands::meta::handle_man(output.clone())?;
            return Ok(());
        }
        _ => {}
    }

    let database_url = config
        .database_url()
        .ok_or("Could not determine a database location; set database.url")?;
    ensure_sqlite_dir(&database_url)?;

    match cli.command {
        Commands::Migrate { action } => {
            commands::migrate::handle_migrate(action, &database_url).await?;
        }
        Commands::Roster { no_rate_limit } => {
            commands::roster::handle_roster(&config, &database_url, no_rate_limit).await?;
        }
        Commands::Sync {
            age_cutoff_hours,
            page_limit,
            no_rate_limit,
        } => {
            let opts = commands::sync::SyncArgs {
                age_cutoff_hours,
                page_limit,
                no_rate_limit,
            };
            commands::sync::handle_sync(opts, &config, &database_url).await?;
        }
        Commands::Repair {
            batch_size,
            no_rate_limit,
        } => {
            commands::repair::handle_repair(batch_size, no_rate_limit, &config, &database_url)
                .await?;
        }
        Commands::Report { action } => {
            commands::report::handle_report(action, &config, &database_url).await?;
        }
        Commands::Status {
            age_cutoff_hours,
            output,
        } => {
            commands::status::handle_status(age_cutoff_hours, output, &config, &database_url)
                .await?;
        }
        Commands::Completions { .. } | Commands::Man { .. } => {}
    }

    Ok(())
}
