use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use clap::Parser;
use invoke_core::config::AppConfig;
use lambda_invoke::InvocationClient;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

const SAMPLE_FUNCTION: &str = "lambdaTest";
const SAMPLE_PAYLOAD: &str = r#"{"name":"bob"}"#;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(
    name = "invoke-cli",
    about = "Invoke one Lambda function and print its response",
    version
)]
struct Cli {
    /// Function name, ARN or alias; falls back to the configured default
    #[arg(long, short = 'f')]
    function: Option<String>,
    /// JSON arguments passed to the function
    #[arg(long, short = 'p', default_value = SAMPLE_PAYLOAD)]
    payload: String,
    /// Queue the invocation instead of waiting for the result
    #[arg(long = "async", default_value_t = false)]
    fire_and_forget: bool,
    /// Pretty-print JSON responses
    #[arg(long, default_value_t = false)]
    pretty: bool,
    /// Also write logs to a daily rolling file in this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_dir.as_deref());

    let config = AppConfig::load().context("failed to load lambda-invoke configuration")?;
    let function = resolve_function(cli.function.as_deref(), &config)?;

    serde_json::from_str::<serde_json::Value>(&cli.payload)
        .context("payload is not valid JSON")?;

    let client = InvocationClient::from_config(&config).await?;
    let output = if cli.fire_and_forget {
        client.invoke_async(&function, &cli.payload).await?
    } else {
        client.invoke_sync(&function, &cli.payload).await?
    };

    println!("{}", render_output(&output, cli.pretty));

    Ok(())
}

/// Explicit name, then the configured default, then the sample function.
fn resolve_function(explicit: Option<&str>, config: &AppConfig) -> Result<String> {
    let explicit = match (explicit, &config.default_function) {
        (Some(name), _) => Some(name),
        (None, Some(_)) => None,
        (None, None) => Some(SAMPLE_FUNCTION),
    };

    config.require_function_name(explicit)
}

fn render_output(output: &str, pretty: bool) -> String {
    if !pretty {
        return output.to_string();
    }

    match serde_json::from_str::<serde_json::Value>(output) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| output.to_string()),
        Err(_) => output.to_string(),
    }
}

fn init_tracing(log_dir: Option<&std::path::Path>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(Level::INFO.into()));

    let fmt_stderr = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let fmt_file = log_dir.map(|dir| {
        if let Err(err) = std::fs::create_dir_all(dir) {
            eprintln!("failed to create log directory {dir:?}: {err}");
        }

        let file_appender = tracing_appender::rolling::daily(dir, "invoke-cli.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let _ = LOG_GUARD.set(guard);

        tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
    });

    let subscriber = Registry::default()
        .with(env_filter)
        .with(fmt_stderr)
        .with(fmt_file);

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // tracing already initialised; ignore.
    }
}
