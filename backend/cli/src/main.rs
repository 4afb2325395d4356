mod repl;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use botkit_logging::{init_logging, LogOptions};

#[derive(Parser)]
#[command(name = "botkit")]
#[command(about = "botkit — chat-bot command dispatch toolkit")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive console session against a local registry
    Repl {
        /// Identity-settings file backing the registry
        #[arg(long, default_value = "botkit-settings.json")]
        data_file: PathBuf,
        /// Directory for rolling log files (console-only logging if unset)
        #[arg(long)]
        log_dir: Option<PathBuf>,
        /// Fallback log level when RUST_LOG is unset
        #[arg(long, default_value = "info")]
        log_level: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Repl {
            data_file,
            log_dir,
            log_level,
        } => {
            init_logging(&LogOptions {
                level: log_level,
                log_dir,
            });
            repl::run(&data_file).await?;
        }
    }

    Ok(())
}
