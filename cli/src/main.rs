use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{anyhow, Context};
use clap::{Parser, ValueEnum};
use log::{debug, error, info, warn, LevelFilter};
use network::{Connection, Endpoint};

use crate::config::{Config, ConfigError};

mod config;
mod logging;

const CONFIG_PATH: &str = "mcquery.toml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(value_enum)]
    mode: Mode,

    address: String,

    #[arg(long, short, help = "Server port (defaults to the configured port for the mode)")]
    port: Option<u16>,

    #[arg(long, short, help = "Seconds to wait for a response")]
    timeout: Option<u64>,

    #[arg(long, default_value_t = false, help = "Require the address to be an IPv4 literal")]
    resolve: bool,

    #[arg(long, help = "Overrides the configured log level")]
    log_level: Option<LevelFilter>,

    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Mode {
    /// Server list ping over TCP.
    Ping,
    /// Full stat query over UDP.
    Query,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    #[cfg(feature = "console")]
    console_subscriber::init();

    let args = Args::parse();
    let config = load_config(&args.config, args.log_level)?;

    if let Err(err) = run(args, &config).await {
        error!("{:#}", err);
        std::process::exit(1);
    }

    Ok(())
}

fn load_config(path: &Path, log_level: Option<LevelFilter>) -> anyhow::Result<Config> {
    match config::read(path) {
        Ok(config) => {
            logging::init(log_level.unwrap_or(config.defaults.log_level))?;
            Ok(config)
        }
        Err(err) => {
            logging::init(log_level.unwrap_or(LevelFilter::Info))?;

            let not_found = matches!(err, ConfigError::NotFound);
            warn!("failed to read config file: {:#}", anyhow!(err));

            let config = Config::default();
            if not_found {
                if let Err(err) = config.write(path) {
                    warn!("failed to create new config file: {:#}", anyhow!(err));
                } else {
                    info!("initialized default config file ({})", path.display());
                }
            }

            Ok(config)
        }
    }
}

async fn run(args: Args, config: &Config) -> anyhow::Result<()> {
    let port = args.port.unwrap_or(match args.mode {
        Mode::Ping => config.defaults.port,
        Mode::Query => config.query.port,
    });
    let timeout = Duration::from_secs(args.timeout.unwrap_or(config.defaults.timeout_secs));
    let endpoint = Endpoint::new(args.address, port, timeout);

    if args.resolve {
        let address = endpoint.resolve()?;
        debug!("using {address}");
    }

    let target = format!("{}:{}", endpoint.address, endpoint.port);
    let output = match args.mode {
        Mode::Ping => {
            let mut connection = Connection::connect_tcp(endpoint)
                .await
                .with_context(|| format!("failed to connect to {target}"))?;
            let status = connection.ping().await;
            connection.disconnect();

            let status = status.with_context(|| format!("failed to ping {target}"))?;
            serde_json::to_string_pretty(&status)?
        }
        Mode::Query => {
            let mut connection = Connection::connect_udp(endpoint)
                .await
                .with_context(|| format!("failed to connect to {target}"))?;
            let status = connection.query().await;
            connection.disconnect();

            let status = status.with_context(|| format!("failed to query {target}"))?;
            serde_json::to_string_pretty(&status)?
        }
    };

    println!("{output}");
    Ok(())
}
