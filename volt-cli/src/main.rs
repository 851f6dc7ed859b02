use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod auth;
mod commands;
mod config;
mod dashboard;
mod export;
mod insight;
mod state;

#[derive(Parser, Debug)]
#[command(name = "volt", version, about = "Volt: personal electricity-bill tracker")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default config file under ~/.volt
    Init,

    /// Add a new bill record
    Add(commands::AddArgs),

    /// Replace an existing record by id
    Edit(commands::EditArgs),

    /// Delete a record by id (asks for confirmation)
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Print all records, newest first
    List,

    /// Print aggregate statistics
    Stats,

    /// Interactive dashboard: stat tiles, spending chart, history
    Dashboard,

    /// Export all records to a spreadsheet file
    Export {
        /// Output path (default: electric_bills.csv)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Generate an AI usage report from the most recent records
    Analyze,

    /// Extract amount/date fields from a receipt photo
    Scan { image: PathBuf },

    /// Manage API credentials
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Paste and store a Gemini API key
    PasteGeminiKey,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Init => {
            config::init_config()?;
        }

        Command::Auth { command } => match command {
            AuthCommand::PasteGeminiKey => {
                auth::paste_gemini_key()?;
            }
        },

        Command::Scan { image } => {
            let cfg = config::load_config()?;
            commands::scan(&cfg, &image).await?;
        }

        Command::Add(args) => {
            let cfg = config::load_config()?;
            let mut store = commands::open_store(&cfg).await?;
            commands::add(&mut store, &cfg, args).await?;
        }

        Command::Edit(args) => {
            let cfg = config::load_config()?;
            let mut store = commands::open_store(&cfg).await?;
            commands::edit(&mut store, args).await?;
        }

        Command::Delete { id, yes } => {
            let cfg = config::load_config()?;
            let mut store = commands::open_store(&cfg).await?;
            commands::delete(&mut store, &id, yes).await?;
        }

        Command::List => {
            let cfg = config::load_config()?;
            let store = commands::open_store(&cfg).await?;
            commands::list(&store);
        }

        Command::Stats => {
            let cfg = config::load_config()?;
            let store = commands::open_store(&cfg).await?;
            commands::stats(&store);
        }

        Command::Dashboard => {
            let cfg = config::load_config()?;
            let store = commands::open_store(&cfg).await?;
            dashboard::run_dashboard(store.list())?;
        }

        Command::Export { out } => {
            let cfg = config::load_config()?;
            let store = commands::open_store(&cfg).await?;
            commands::export(&store, out)?;
        }

        Command::Analyze => {
            let cfg = config::load_config()?;
            let store = commands::open_store(&cfg).await?;
            commands::analyze(&store, &cfg).await?;
        }
    }

    Ok(())
}
