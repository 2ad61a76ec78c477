use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use glmchat::cli::run_chat;
use glmchat::{Commands, Container, ContainerConfig, Router};

#[derive(Parser)]
#[command(name = "glmchat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write log lines to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// API key (falls back to ZHIPUAI_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// glm-4-flash or glm-4-long
    #[arg(short, long, global = true)]
    model: Option<String>,

    #[arg(short, long, global = true)]
    temperature: Option<f32>,

    #[arg(long, global = true)]
    top_p: Option<f32>,

    #[arg(long, global = true)]
    max_tokens: Option<u32>,

    /// Endpoint base URL (falls back to ZHIPUAI_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[arg(long, global = true, default_value = "60")]
    timeout_secs: u64,

    /// Largest number of turns a conversation may reach
    #[arg(long, global = true, default_value = "200")]
    max_turns: usize,

    /// Echo replies locally instead of calling the endpoint
    #[arg(long, global = true)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_file.as_ref())?;

    let command = cli.command.clone().unwrap_or(Commands::Chat);
    let container = Container::new(ContainerConfig {
        api_key: cli.api_key,
        model: cli.model,
        temperature: cli.temperature,
        top_p: cli.top_p,
        max_tokens: cli.max_tokens,
        base_url: cli.base_url,
        timeout_secs: cli.timeout_secs,
        max_turns: cli.max_turns,
        mock: cli.mock,
    })?;

    if command == Commands::Chat {
        return run_chat(&container).await;
    }

    let router = Router::new(&container);
    let output = router.route(command).await?;
    println!("{}", output);
    Ok(())
}

fn init_tracing(verbose: bool, log_file: Option<&PathBuf>) -> Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false);

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            let subscriber = builder.with_ansi(false).with_writer(Mutex::new(file)).finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        None => {
            let subscriber = builder.with_writer(std::io::stderr).finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}
