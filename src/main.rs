//! CLI entry point for the LIRR delay-cause predictor.
//!
//! Provides subcommands for a single prediction run, a periodic refresh loop,
//! and a plain live delay report.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use lirr_delay_predictor::{
    config::{AppConfig, parse_timezone},
    delays::collect_delays,
    fetch::{BasicClient, HttpClient, read_source},
    mapping::IdentifierMapper,
    output::{append_records, print_pretty, records, render_delays, render_outcome, to_json},
    parser::decode_trip_updates,
    pipeline::{CycleOutcome, Predictor},
    static_data::StaticData,
};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "lirr_delay_predictor")]
#[command(about = "Predicts likely delay causes for active LIRR trains", long_about = None)]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Commands,
}

/// Command-line overrides for the environment configuration.
#[derive(Args)]
struct Overrides {
    /// Feed URL or path to a saved feed snapshot
    #[arg(long, global = true, value_name = "FILE_OR_URL")]
    source: Option<String>,

    /// Trained model artifact (JSON)
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Trained column list artifact (JSON)
    #[arg(long, global = true)]
    columns: Option<PathBuf>,

    /// JSON overrides for the route, stop and hub-station tables
    #[arg(long, global = true)]
    static_data: Option<PathBuf>,

    /// IANA time zone used for departure times, e.g. America/New_York
    #[arg(long, global = true)]
    timezone: Option<String>,

    /// Maximum number of trains to display
    #[arg(long, global = true)]
    limit: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the live feed once and print the top delay causes per train
    Predict {
        /// Print JSON instead of the text report
        #[arg(long, default_value_t = false)]
        json: bool,

        /// CSV file to append ranked predictions to
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Re-run the prediction cycle at a fixed interval
    Watch {
        /// Seconds between cycles
        #[arg(short = 'r', long, default_value_t = 60)]
        interval: u64,

        /// Number of cycles to run (0 = infinite)
        #[arg(short = 'n', long, default_value_t = 0)]
        num_samples: usize,

        /// CSV file to append ranked predictions to
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Print every stop the live feed reports as running late
    Delays,
}

impl Overrides {
    fn apply(self, mut config: AppConfig) -> Result<AppConfig> {
        if let Some(source) = self.source {
            config.feed_source = source;
        }
        if let Some(model) = self.model {
            config.model_path = model;
        }
        if let Some(columns) = self.columns {
            config.columns_path = columns;
        }
        if let Some(path) = self.static_data {
            config.static_data_path = Some(path);
        }
        if let Some(tz) = self.timezone {
            config.timezone = parse_timezone(&tz)?;
        }
        if let Some(limit) = self.limit {
            config.display_limit = limit;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/lirr_delay_predictor.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("lirr_delay_predictor.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = cli.overrides.apply(AppConfig::from_env()?)?;
    let client = BasicClient::new(config.fetch_timeout)?;

    match cli.command {
        Commands::Predict { json, output } => {
            let predictor =
                Predictor::load(&config).context("cannot start without the model artifacts")?;
            let outcome = predictor.run_cycle(&client, &config.feed_source).await;
            report(&outcome, &config, json, output.as_deref())?;
        }
        Commands::Watch {
            interval,
            num_samples,
            output,
        } => {
            let predictor =
                Predictor::load(&config).context("cannot start without the model artifacts")?;

            if num_samples == 0 {
                info!(interval, "Refreshing indefinitely. Press Ctrl+C to stop.");
            }

            let mut sample_count = 0;
            loop {
                if num_samples > 0 && sample_count >= num_samples {
                    break;
                }
                sample_count += 1;

                info!(sample = sample_count, "Starting prediction cycle");
                watch_sample(&predictor, &client, &config, output.as_deref()).await;

                if num_samples == 0 || sample_count < num_samples {
                    tokio::time::sleep(tokio::time::Duration::from_secs(interval)).await;
                }
            }
        }
        Commands::Delays => {
            let static_data = match &config.static_data_path {
                Some(path) => StaticData::load(path)?,
                None => StaticData::lirr(),
            };
            let mapper = IdentifierMapper::from_static(&static_data);

            info!("Fetching live LIRR data");
            let delays = match read_source(&client, &config.feed_source).await {
                Ok(bytes) => match decode_trip_updates(&bytes) {
                    Ok(updates) => collect_delays(&updates, &mapper),
                    Err(e) => {
                        warn!(error = %e, "Feed parse failed");
                        println!("An error occurred: {e}");
                        return Ok(());
                    }
                },
                Err(e) => {
                    warn!(error = %e, "Feed fetch failed");
                    println!("Error fetching data: {e:#}");
                    return Ok(());
                }
            };
            println!("{}", render_delays(&delays));
        }
    }

    Ok(())
}

/// Runs and reports one refresh cycle. Reporting failures are logged and the
/// loop carries on with the next sample.
async fn watch_sample<C: HttpClient + ?Sized>(
    predictor: &Predictor,
    client: &C,
    config: &AppConfig,
    output: Option<&str>,
) -> CycleOutcome {
    let outcome = predictor.run_cycle(client, &config.feed_source).await;
    if let Err(e) = report(&outcome, config, false, output) {
        warn!(error = %e, "Failed to report cycle; continuing");
    }
    outcome
}

/// Prints one cycle outcome and appends successful predictions to `output`.
fn report(outcome: &CycleOutcome, config: &AppConfig, json: bool, output: Option<&str>) -> Result<()> {
    match outcome {
        CycleOutcome::Success(predictions) => {
            print_pretty(predictions);
            if json {
                println!("{}", to_json(predictions, config.display_limit)?);
            } else {
                println!("{}", render_outcome(outcome, config.display_limit));
            }
            if let Some(path) = output {
                append_records(path, &records(Utc::now(), predictions))?;
                info!(path, "Predictions appended");
            }
        }
        other => {
            if other.is_error() {
                warn!(outcome = ?other, "Prediction cycle failed");
            }
            println!("{}", render_outcome(other, config.display_limit));
        }
    }
    Ok(())
}
