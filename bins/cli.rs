use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tokio::io::BufReader;
use tracing::{info, warn};

use cli::Repl;
use common::utils::logging::init_logging_stderr;
use configs::AppConfig;
use service::storage::{JsonStore, KeyPolicy};

/// Interactive shell over a local JSON key-value store file.
#[derive(Parser, Debug)]
#[command(name = "kv-cli", version, about)]
struct Cli {
    /// Config file; defaults to $CONFIG_PATH or ./config.toml
    #[arg(long)]
    config: Option<String>,

    /// Store file, overriding `[store].file_path`
    #[arg(long)]
    file: Option<PathBuf>,

    /// Start with an empty store instead of loading the file
    #[arg(long)]
    no_load: bool,

    /// Do not write the store back on exit
    #[arg(long)]
    no_save: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print an argon2 PHC hash for use under `[auth.users]`
    HashPassword { password: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_stderr();

    let args = Cli::parse();

    if let Some(Commands::HashPassword { password }) = args.command {
        println!("{}", service::auth::hash_password(&password)?);
        return Ok(());
    }

    let cfg = match &args.config {
        Some(path) => AppConfig::load_and_validate_from(path)?,
        None => AppConfig::load_and_validate()?,
    };
    let path = args.file.unwrap_or_else(|| PathBuf::from(&cfg.store.file_path));
    let store = JsonStore::with_policy(&path, KeyPolicy::from_max_len(cfg.store.max_key_len));

    if !args.no_load {
        match store.load().await {
            Ok(count) => info!(path = %path.display(), entries = count, "store loaded"),
            Err(e) => warn!(path = %path.display(), error = %e, "starting with an empty store"),
        }
    }

    let mut repl = Repl::new(&store, tokio::io::stdout(), !args.no_save);
    repl.run(BufReader::new(tokio::io::stdin())).await?;
    Ok(())
}
