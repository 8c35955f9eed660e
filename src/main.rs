use anyhow::{Context, Result};
use releasectl::cli::commands::PushCommand;
use releasectl::cli::output::{format_failure, format_outcome, format_push_event};
use releasectl::cli::{Cli, Command};
use releasectl::core::PushConfig;
use releasectl::execution::ReleasePipeline;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match &cli.command {
        Command::Push(cmd) => push(&cli, cmd).await?,
    }

    Ok(())
}

async fn push(cli: &Cli, cmd: &PushCommand) -> Result<()> {
    let file = cli.config_file()?;
    let config = PushConfig::new(cli.server_config(&file), cmd.release_settings(&file));
    debug!("Using server {} with token {}", config.server.url, config.server.token_path.display());

    let mut pipeline = ReleasePipeline::from_config(config).context("Failed to create API client")?;
    pipeline.add_event_handler(|event| println!("{}", format_push_event(event)));

    match pipeline.push(&cmd.group).await {
        Ok(outcome) => {
            println!("\n{}", format_outcome(&outcome));
            Ok(())
        }
        Err(e) => {
            eprintln!("\n{}", format_failure(&e));
            std::process::exit(1);
        }
    }
}
