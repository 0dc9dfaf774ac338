use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "sofia")]
#[command(about = "Therapy chat assistant: Gemini proxy and terminal client", long_about = None)]
struct Cli {
    /// `SQLite` database holding transcripts and profiles.
    #[arg(long, global = true, env = "SOFIA_DB_PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Gemini proxy server
    Serve {
        #[arg(short, long, default_value = "8787")]
        port: u16,
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Chat in the terminal; today's transcript is saved
    Chat {
        #[arg(short, long, default_value = "local")]
        user: String,
        /// Proxy origin. Without it Gemini is called directly with the local key.
        #[arg(long, env = "SOFIA_PROXY_URL")]
        proxy_url: Option<String>,
        /// Print replies at once instead of simulating typing
        #[arg(long)]
        no_typing: bool,
    },
    /// Print a day's transcript as JSON
    History {
        #[arg(short, long, default_value = "local")]
        user: String,
        /// Day as YYYY-MM-DD, today (UTC) by default
        #[arg(short, long)]
        day: Option<String>,
    },
    /// List days with a saved transcript
    Days {
        #[arg(short, long, default_value = "local")]
        user: String,
    },
    /// Delete a day's saved transcript
    Clear {
        #[arg(short, long, default_value = "local")]
        user: String,
        #[arg(short, long)]
        day: Option<String>,
    },
    /// Show the onboarding profile, or replace it from a JSON file
    Profile {
        #[arg(short, long, default_value = "local")]
        user: String,
        #[arg(long)]
        set: Option<PathBuf>,
    },
}

pub(crate) fn get_db_path() -> PathBuf {
    dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")).join("sofia-chat").join("chat.db")
}

pub(crate) fn ensure_db_dir(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db_path = cli.db.unwrap_or_else(get_db_path);

    match cli.command {
        Commands::Serve { port, host } => commands::serve::run(port, host).await?,
        Commands::Chat { user, proxy_url, no_typing } => {
            commands::chat::run(&db_path, &user, proxy_url, no_typing).await?;
        },
        Commands::History { user, day } => {
            commands::transcript::run_history(&db_path, &user, day.as_deref()).await?;
        },
        Commands::Days { user } => commands::transcript::run_days(&db_path, &user).await?,
        Commands::Clear { user, day } => {
            commands::transcript::run_clear(&db_path, &user, day.as_deref()).await?;
        },
        Commands::Profile { user, set } => {
            commands::profile::run(&db_path, &user, set.as_deref()).await?;
        },
    }

    Ok(())
}
