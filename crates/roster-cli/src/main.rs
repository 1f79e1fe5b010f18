use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::context::Context;

#[derive(Parser)]
#[command(name = "roster")]
#[command(about = "Roster CLI - manage users through a synchronized collection store", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.config/roster/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List one page of users
    List(commands::list::ListArgs),
    /// Show a single user
    Show {
        /// User id
        id: String,
    },
    /// Create a user
    Create(commands::create::CreateArgs),
    /// Update fields of a user
    Update(commands::update::UpdateArgs),
    /// Delete a user
    Delete {
        /// User id
        id: String,
    },
    /// Delete several users in one request
    BulkDelete {
        /// User ids
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Export users as delimited text
    Export(commands::export::ExportArgs),
    /// Search interactively, one query per stdin line
    Search,
    /// List the role catalog
    Roles,
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let context = Context::load(cli.config)?;

    match cli.command {
        Commands::List(args) => commands::list::run(&context, args).await?,
        Commands::Show { id } => commands::show::run(&context, &id).await?,
        Commands::Create(args) => commands::create::run(&context, args).await?,
        Commands::Update(args) => commands::update::run(&context, args).await?,
        Commands::Delete { id } => commands::delete::run(&context, &id).await?,
        Commands::BulkDelete { ids } => commands::delete::run_bulk(&context, &ids).await?,
        Commands::Export(args) => commands::export::run(&context, args).await?,
        Commands::Search => commands::search::run(&context).await?,
        Commands::Roles => commands::roles::run(&context).await?,
    }

    Ok(())
}
