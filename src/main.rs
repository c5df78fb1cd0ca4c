use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dota_meta::api::{self, state::AppState};
use dota_meta::config::AppConfig;
use dota_meta::service::AnalyticsService;
use dota_meta::source::OpenDotaClient;

#[derive(Parser)]
#[command(name = "dota-meta")]
#[command(about = "Dota 2 match statistics with always-available fallback data")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Bind address (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port number (defaults to server.port)
        #[arg(long)]
        port: Option<u16>,

        /// Log all HTTP requests
        #[arg(long)]
        access_log: bool,
    },

    /// Compute one statistic and print it as JSON
    Report {
        #[arg(value_enum)]
        stat: StatKind,

        /// Year to cover (rank, items, factions)
        #[arg(long)]
        year: Option<i32>,

        /// Number of heroes (heroes)
        #[arg(long)]
        limit: Option<u32>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatKind {
    Rank,
    Heroes,
    Items,
    Factions,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting dota-meta v{}", env!("CARGO_PKG_VERSION"));

    let client = OpenDotaClient::new(config.upstream.client_config())?;
    tracing::info!("Upstream: {}", config.upstream.base_url);
    let analytics = Arc::new(AnalyticsService::new(
        Arc::new(client),
        config.analytics.clone(),
    ));

    match cli.command {
        Commands::Serve {
            host,
            port,
            access_log,
        } => {
            let state = AppState::new(analytics).with_cors_origin(&config.server.cors_origin);
            let mut app = api::build_router(state);
            if access_log {
                app = app.layer(TraceLayer::new_for_http());
            }

            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Report { stat, year, limit } => {
            let defaults = analytics.config();
            let year = year.unwrap_or(defaults.default_year);
            let output = match stat {
                StatKind::Rank => to_json(&Report {
                    year: Some(year),
                    limit: None,
                    data: analytics.rank_distribution(year).await,
                })?,
                StatKind::Heroes => {
                    let limit = limit.unwrap_or(defaults.default_hero_limit).max(1);
                    to_json(&Report {
                        year: None,
                        limit: Some(limit),
                        data: analytics.hero_win_rates(limit).await,
                    })?
                }
                StatKind::Items => to_json(&Report {
                    year: Some(year),
                    limit: None,
                    data: analytics.item_win_rates(year).await,
                })?,
                StatKind::Factions => to_json(&Report {
                    year: Some(year),
                    limit: None,
                    data: analytics.faction_win_rates(year).await,
                })?,
            };
            println!("{}", output);

            let stats = analytics.stats().await;
            if stats.total_fallbacks() > 0 {
                tracing::warn!("Report served from fallback data");
            }
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct Report<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
    data: Vec<T>,
}

fn to_json<T: Serialize>(report: &Report<T>) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
