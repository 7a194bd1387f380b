use std::path::PathBuf;

use clap::{Parser, Subcommand};
use postvault::config::Config;
use postvault::process::{self, Target};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "postvault", version, about = "Archives subreddit posts as Markdown files")]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "postvault.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Archive every post linked from the configured index page.
    Index,
    /// Archive the posts linked from specific discussion threads.
    Threads {
        /// Thread ids (bare or `t3_`-prefixed).
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("postvault=info")),
        )
        .init();

    let cli = Cli::parse();
    let target = match cli.command {
        Command::Index => Target::Index,
        Command::Threads { ids } => Target::Threads(ids),
    };

    let result = async {
        let config = Config::load(&cli.config).await?;
        process::run(&config, target).await
    }
    .await;

    if let Err(e) = result {
        error!("{e}");
        std::process::exit(1);
    }
}
