//! host-summary: AI security summaries for hosts in a static scan dataset.
//!
//! Usage:
//!   host-summary                      # serve on the configured bind address
//!   host-summary serve --bind 0.0.0.0:5001 --dataset hosts_dataset.json
//!   host-summary summarize --ip 1.2.3.4

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use host_summary::config::{Config, DEFAULT_LOG_LEVEL, load_env};
use host_summary::http::{build_service, start_http_server};
use host_summary::summary::split_sections;

#[derive(Parser)]
#[command(name = "host-summary")]
#[command(about = "Summarize scanned hosts with a text-generation model", long_about = None)]
struct Cli {
    /// Dataset file to read host records from
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve {
        /// Address to listen on
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Summarize one host and print the result
    Summarize {
        #[arg(long)]
        ip: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Env file first so RUST_LOG / HOST_SUMMARY_LOG from it apply to the subscriber
    load_env();
    let log_level =
        std::env::var("HOST_SUMMARY_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::load()?;
    if let Some(dataset) = cli.dataset {
        config.dataset.path = dataset;
    }

    match cli.command.unwrap_or(Commands::Serve { bind: None }) {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            info!("Starting host-summary server");
            start_http_server(config).await?;
        }
        Commands::Summarize { ip } => {
            let service = build_service(&config)?;
            let result = service.summarize(Some(ip.as_str())).await?;
            let sections = split_sections(&result.summary);
            match (sections.bullets, sections.paragraph) {
                (Some(bullets), Some(paragraph)) => {
                    println!("Bullet Point Summary\n{}\n", bullets);
                    println!("Paragraph Summary\n{}", paragraph);
                }
                _ => println!("{}", result.summary),
            }
        }
    }

    Ok(())
}
