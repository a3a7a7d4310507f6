use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use trackit::config::Config;
use trackit::normalize::{FixedClock, ShipmentNormalizer};
use trackit::{logging, observability, server};

#[derive(Parser)]
#[command(name = "trackit")]
#[command(about = "Normalize heterogeneous carrier tracking data into one canonical shipment")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (defaults to $TRACKIT_CONFIG, then trackit.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Port to listen on, overriding the config
        #[arg(long)]
        port: Option<u16>,
    },
    /// Normalize one JSON payload read from a file or stdin
    Normalize {
        /// Carrier identifier, e.g. Format-A
        #[arg(long)]
        carrier: String,
        /// Payload file; stdin when omitted
        #[arg(long)]
        file: Option<PathBuf>,
        /// Fixed last_update timestamp in epoch seconds
        #[arg(long)]
        timestamp: Option<f64>,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
    /// List registered carrier identifiers
    Carriers,
    /// Print the canonical status for a raw carrier status token
    Translate {
        status: String,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => {
            let mut config = Config::load_from(path)
                .with_context(|| format!("loading config from {}", path.display()))?;
            config.apply_overrides(|key| std::env::var(key).ok())?;
            config
        }
        None => Config::load().context("loading config")?,
    };
    Ok(config)
}

fn read_payload(file: Option<&PathBuf>) -> anyhow::Result<Value> {
    let content = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading payload from stdin")?;
            buf
        }
    };
    serde_json::from_str(&content).context("payload is not valid JSON")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Serve { port } => {
            let _guard = logging::init_logging();
            if let Some(port) = port {
                config.server.port = port;
            }
            if config.metrics.enabled {
                observability::metrics::init(config.metrics.port);
            }
            info!(
                host = %config.server.host,
                port = config.server.port,
                "Starting TrackIt"
            );
            server::start_server(&config).await?;
        }
        Commands::Normalize {
            carrier,
            file,
            timestamp,
            pretty,
        } => {
            logging::init_cli_logging();
            let raw = read_payload(file.as_ref())?;

            let mut normalizer =
                ShipmentNormalizer::new().with_vocabulary(config.status_vocabulary());
            if let Some(ts) = timestamp {
                if !ts.is_finite() {
                    bail!("--timestamp must be a finite number");
                }
                normalizer = normalizer.with_clock(Arc::new(FixedClock(ts)));
            }

            let shipment = normalizer.normalize(&raw, &carrier)?;
            let output = if pretty {
                serde_json::to_string_pretty(&shipment)?
            } else {
                serde_json::to_string(&shipment)?
            };
            println!("{}", output);
        }
        Commands::Carriers => {
            logging::init_cli_logging();
            for carrier in ShipmentNormalizer::new().registry().list_carriers() {
                println!("{}", carrier);
            }
        }
        Commands::Translate { status: raw } => {
            logging::init_cli_logging();
            println!("{}", config.status_vocabulary().translate(&raw));
        }
    }

    Ok(())
}
