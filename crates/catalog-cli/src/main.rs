use clap::{ArgAction, Parser, Subcommand};
use catalog_config::{Config, PathManager};
use color_eyre::eyre::Context;
use commands::{export, serve, wishlist};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "plex-catalog")]
#[command(about = "Catalog which Plex titles have a DVD, Blue-ray, ISO or ripped backup")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the backup catalog workbook
    #[command(long_about = "Enumerate every movie and show library on the Plex server, classify each title's backups and write the catalog workbook. When GOOGLE_SHEET_NAME is configured the same sheets are pushed to that spreadsheet.")]
    Export {
        /// Base directory for the timestamped output folder
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Skip the spreadsheet sync even when one is configured
        #[arg(long, action = ArgAction::SetTrue)]
        no_sync: bool,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        cmd: WishlistCommands,
    },
    /// Serve the wishlist over HTTP
    #[command(long_about = "Run the wishlist JSON API (GET/POST /wishlist, PUT/DELETE /wishlist/:index, GET /health).")]
    Serve {
        /// Address to listen on (default 127.0.0.1:5000 or CATALOG_BIND)
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },
}

#[derive(Subcommand)]
enum WishlistCommands {
    /// Show every entry with its index
    List,
    /// Append an entry
    Add {
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        notes: String,

        /// Desired format, e.g. DVD or Blue-ray
        #[arg(long, default_value = "")]
        format: String,
    },
    /// Change fields of the entry at INDEX
    Update {
        index: usize,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        #[arg(long)]
        format: Option<String>,
    },
    /// Remove the entry at INDEX
    Delete { index: usize },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let paths = PathManager::default();
    let config = Config::load(&paths).wrap_err("Failed to load configuration")?;

    // only the long-running server writes to a file
    let log_file = match &cli.command {
        Commands::Serve { .. } => config.server.log_file.clone(),
        _ => None,
    };
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    if let Err(e) = paths.ensure_directories() {
        tracing::warn!("Could not create {}: {}", paths.config_dir().display(), e);
    }

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Export { output_dir, no_sync } => {
            export::run_export(&config, output_dir, no_sync, &output).await
        }
        Commands::Wishlist { cmd } => match cmd {
            WishlistCommands::List => wishlist::run_list(&config, &output).await,
            WishlistCommands::Add { title, notes, format } => {
                wishlist::run_add(&config, title, notes, format, &output).await
            }
            WishlistCommands::Update {
                index,
                title,
                notes,
                format,
            } => wishlist::run_update(&config, index, title, notes, format, &output).await,
            WishlistCommands::Delete { index } => wishlist::run_delete(&config, index, &output).await,
        },
        Commands::Serve { bind } => serve::run_serve(&config, bind, &output).await,
    }
}
