//! weekend-weather server
//!
//! Loads configuration, starts the REST API and shuts down gracefully on SIGTERM/SIGINT.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use weekend_weather::{Config, SourceKind, WeatherCollector, wait_for_signal};

#[derive(Parser)]
#[command(name = "weekend-weather")]
#[command(about = "Batch collector for weekend weather comparisons", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML configuration file; built-in defaults are used when omitted
    #[arg(short, long, env = "WEEKEND_WEATHER_CONFIG")]
    config: Option<PathBuf>,

    /// Address for the REST API, overriding the configuration
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Default data source for requests that don't name one (synthetic or live)
    #[arg(short, long)]
    mode: Option<SourceKind>,

    /// Weather API credential for live sessions, overriding the configuration
    #[arg(long, env = "WEATHER_API_KEY", hide_env_values = true)]
    weather_api_key: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("weekend_weather=info,tower_http=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server exited with an error");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> weekend_weather::Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(bind) = cli.bind {
        config.server.api.bind_address = bind;
    }
    if let Some(mode) = cli.mode {
        config.source.default_mode = mode;
    }
    if let Some(key) = cli.weather_api_key {
        config.source.api_key = Some(key);
    }

    let collector = WeatherCollector::new(config)?;
    tracing::info!(
        default_mode = %collector.config().source.default_mode,
        "Collector ready"
    );

    let on_signal = collector.clone();
    weekend_weather::api::start_api_server(collector, async move {
        wait_for_signal().await;
        on_signal.shutdown().await;
    })
    .await
}
