mod config;

use crate::config::{Config, ConfigError, MetricsConfig};
use clap::{Parser, Subcommand};
use metrics_exporter_statsd::StatsdBuilder;
use seo::{PageMetadata, SeoClient};
use shared::metrics_defs::describe_metrics;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Multi-tenant storefront services
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Run the routing edge in front of the page renderer
    Edge {
        #[arg(long)]
        config: PathBuf,
    },
    /// Resolve and print the metadata of a page
    Metadata {
        #[arg(long)]
        config: PathBuf,
        /// Request path, e.g. /template/v1/category/shoes
        #[arg(long)]
        path: String,
    },
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid seo config: {0}")]
    SeoConfig(#[from] seo::config::ValidationError),
    #[error("could not create seo client: {0}")]
    SeoClient(#[from] seo::client::ClientError),
    #[error(transparent)]
    Edge(#[from] edge::EdgeError),
    #[error("could not set up metrics: {0}")]
    Metrics(String),
    #[error("could not start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("could not serialize metadata: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = match &cli.command {
        CliCommand::Edge { config } | CliCommand::Metadata { config, .. } => config,
    };
    let config = match Config::from_file(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be initialised before the runtime starts; the guard flushes on drop
    let sentry_guard = config.sentry_dsn().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });
    init_tracing(sentry_guard.is_some());

    if let Err(e) = run(cli.command, config) {
        tracing::error!(error = %e, "Exiting");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn init_tracing(with_sentry: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let sentry_layer = with_sentry.then(sentry::integrations::tracing::layer);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_layer)
        .init();
}

fn init_metrics(config: &MetricsConfig) -> Result<(), CliError> {
    let recorder = StatsdBuilder::from(config.statsd_host.clone(), config.statsd_port)
        .build(Some(config.prefix.as_str()))
        .map_err(|e| CliError::Metrics(e.to_string()))?;
    metrics::set_global_recorder(recorder).map_err(|e| CliError::Metrics(e.to_string()))?;

    describe_metrics(edge::metrics_defs::ALL_METRICS);
    describe_metrics(seo::metrics_defs::ALL_METRICS);

    tracing::info!(
        host = %config.statsd_host,
        port = config.statsd_port,
        "Sending metrics to statsd"
    );
    Ok(())
}

fn run(command: CliCommand, config: Config) -> Result<(), CliError> {
    if let Some(metrics_config) = &config.common.metrics {
        init_metrics(metrics_config)?;
    }

    let runtime = tokio::runtime::Runtime::new()?;

    match command {
        CliCommand::Edge { .. } => {
            let edge_config = config.edge.ok_or(ConfigError::MissingSection("edge"))?;
            runtime.block_on(edge::run(edge_config))?;
        }
        CliCommand::Metadata { path, .. } => {
            let seo_config = config.seo.ok_or(ConfigError::MissingSection("seo"))?;
            seo_config.validate()?;

            let client = SeoClient::from_config(&seo_config)?;
            let page_metadata = PageMetadata::new(
                client,
                seo_config.defaults.clone(),
                seo_config.pathname_header()?,
            );

            let metadata = runtime.block_on(page_metadata.resolve_path(&path));
            println!("{}", serde_json::to_string_pretty(&metadata)?);
        }
    }

    Ok(())
}
