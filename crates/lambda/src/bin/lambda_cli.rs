use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use invoke_core::config::AppConfig;
use lambda_invoke::InvocationClient;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lambda-cli", about = "Invoke AWS Lambda functions from the shell", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Invoke a function and wait for its result
    Sync {
        /// Function name, ARN or alias; falls back to the configured default
        #[arg(long, short = 'f')]
        function: Option<String>,
        /// Payload passed to the function
        #[arg(long, short = 'p', default_value = "{}")]
        payload: String,
    },
    /// Queue an event for the function without waiting
    Async {
        /// Function name, ARN or alias; falls back to the configured default
        #[arg(long, short = 'f')]
        function: Option<String>,
        /// Payload passed to the function
        #[arg(long, short = 'p', default_value = "{}")]
        payload: String,
    },
    /// Print the effective configuration with secrets hidden
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let cli = Cli::parse();
    let config = AppConfig::load().context("failed to load lambda-invoke configuration")?;
    let config = &config;

    match cli.command {
        Command::Sync { function, payload } => {
            let function = config.require_function_name(function.as_deref())?;
            let client = InvocationClient::from_config(config).await?;
            let output = client.invoke_sync(&function, &payload).await?;
            println!("{}", output);
        }
        Command::Async { function, payload } => {
            let function = config.require_function_name(function.as_deref())?;
            let client = InvocationClient::from_config(config).await?;
            let output = client.invoke_async(&function, &payload).await?;
            println!("{}", output);
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config.redacted())?);
        }
    }

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if tracing::subscriber::set_global_default(
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish(),
    )
    .is_err()
    {
        // tracing already initialised; ignore.
    }
    Ok(())
}
