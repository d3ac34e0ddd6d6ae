use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info};
use risk_estimator::data::kraken::get_kraken_prices;
use risk_estimator::report::{
    calculate_risk_report, calculate_volatility, calculate_volatility_from_prices, BadRequest,
    Outcome, PricesRequest, ReturnsRequest, RiskReportRequest,
};
use risk_estimator::Settings;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "risk_estimator")]
#[command(about = "Volatility, VaR and CVaR from prices or returns")]
struct Cli {
    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Historical and EWMA volatility of a return series
    Volatility {
        /// JSON request file, stdin when omitted
        input: Option<PathBuf>,
    },
    /// Historical and EWMA volatility of the log-returns of a price series
    VolatilityFromPrices { input: Option<PathBuf> },
    /// Full report: volatility, VaR and CVaR
    RiskReport { input: Option<PathBuf> },
    /// Fetch recent bars from Kraken and report on their closes
    Kraken {
        /// Overrides KRAKEN_PAIR
        #[arg(long)]
        pair: Option<String>,
        /// Overrides DEFAULT_CONFIDENCE for this run
        #[arg(long)]
        confidence_level: Option<f64>,
    },
}

fn read_request<T: DeserializeOwned>(input: Option<&PathBuf>) -> Result<T> {
    let raw = match input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    serde_json::from_str(&raw).map_err(|e| anyhow!("Malformed request: {}", e))
}

fn render<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(out)
}

/// Writes the report to stdout, or the bad-request body to stderr.
fn emit<T: Serialize>(outcome: Outcome<T>, pretty: bool) -> Result<ExitCode> {
    match outcome {
        Ok(report) => {
            println!("{}", render(&report, pretty)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(bad) => {
            eprintln!("{}", render::<BadRequest>(&bad, pretty)?);
            Ok(ExitCode::from(2))
        }
    }
}

async fn run(cli: Cli, settings: Settings) -> Result<ExitCode> {
    let defaults = settings.defaults;

    match cli.command {
        Command::Volatility { input } => {
            let request: ReturnsRequest = read_request(input.as_ref())?;
            emit(calculate_volatility(&request), cli.pretty)
        }
        Command::VolatilityFromPrices { input } => {
            let request: PricesRequest = read_request(input.as_ref())?;
            emit(
                calculate_volatility_from_prices(&request, &defaults),
                cli.pretty,
            )
        }
        Command::RiskReport { input } => {
            let request: RiskReportRequest = read_request(input.as_ref())?;
            emit(calculate_risk_report(&request, &defaults), cli.pretty)
        }
        Command::Kraken {
            pair,
            confidence_level,
        } => {
            let pair = pair.unwrap_or(settings.kraken_pair);
            let bars = get_kraken_prices(&pair, &settings.timespan, settings.request_timeout).await?;

            // Keep only the most recent VOLATILITY_PERIOD bars
            let skip = bars.len().saturating_sub(settings.volatility_period);
            let prices: Vec<f64> = bars[skip..].iter().map(|&(_, close)| close).collect();

            if let (Some((first, _)), Some((last, _))) = (bars.get(skip), bars.last()) {
                info!(
                    "Using {} {} bars of {} from {} to {}",
                    prices.len(),
                    settings.timespan,
                    pair,
                    first,
                    last
                );
            }

            let request = RiskReportRequest {
                prices: Some(prices),
                confidence_level,
                ..Default::default()
            };
            emit(calculate_risk_report(&request, &defaults), cli.pretty)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            eprintln!("Invalid configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli, settings).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
