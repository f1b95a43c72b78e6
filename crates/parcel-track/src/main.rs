// # parcel-track
//
// Thin command-line front end. Tracking logic lives in the courier crates;
// this binary only:
// 1. Reads arguments and environment variables
// 2. Initializes logging and the runtime
// 3. Registers couriers and dispatches one lookup
// 4. Prints the result as JSON
//
// ## Usage
//
// ```bash
// parcel-track usps EJ958083578US
// parcel-track hkpost RC123456789HK
// parcel-track dpduk 15976967
// ```
//
// ## Configuration
//
// - `PARCEL_LOG_LEVEL`: trace, debug, info, warn, error (default: warn)
// - `PARCEL_TIMEOUT_SECS`: per-request timeout, 1..=300 (default: 30)
// - `PARCEL_USER_AGENT`: User-Agent header
// - `PARCEL_USPS_URL`, `PARCEL_HKPOST_URL`,
//   `PARCEL_DPDUK_PARCEL_URL`, `PARCEL_DPDUK_DELIVERY_URL`: endpoint overrides
//
// Logs go to stderr so stdout carries only JSON.

use anyhow::{Context, Result};
use parcel_core::{Carrier, CourierRegistry, Dispatcher, TrackerConfig};
use parcel_transport_http::ReqwestTransport;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, debug, error};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for the different outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrackExitCode {
    /// Checkpoints printed
    Success = 0,
    /// Bad arguments or configuration
    ConfigError = 1,
    /// Transport, upstream or parse failure
    TrackingFailed = 2,
    /// Carrier reports no such tracking number
    RecordNotFound = 3,
}

impl From<TrackExitCode> for ExitCode {
    fn from(code: TrackExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    carrier: Carrier,
    tracking_number: String,
    tracker: TrackerConfig,
    log_level: String,
}

impl Config {
    /// Load configuration from arguments and environment variables
    fn from_env() -> Result<Self> {
        let args: Vec<String> = env::args().skip(1).collect();
        Self::from_sources(&args, |key| env::var(key).ok())
    }

    fn from_sources(args: &[String], lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let [carrier, tracking_number] = args else {
            anyhow::bail!(
                "Usage: parcel-track <carrier> <tracking-number>. Carriers: {}",
                carrier_names()
            );
        };

        let carrier: Carrier = carrier
            .parse()
            .with_context(|| format!("Supported carriers: {}", carrier_names()))?;

        let mut tracker = TrackerConfig::new();

        if let Some(timeout) = lookup("PARCEL_TIMEOUT_SECS") {
            tracker.transport.timeout_secs = timeout
                .trim()
                .parse()
                .with_context(|| format!("PARCEL_TIMEOUT_SECS is not a number: {}", timeout))?;
        }
        if let Some(user_agent) = lookup("PARCEL_USER_AGENT") {
            tracker.transport.user_agent = user_agent;
        }
        if let Some(url) = lookup("PARCEL_USPS_URL") {
            tracker.endpoints.usps = url;
        }
        if let Some(url) = lookup("PARCEL_HKPOST_URL") {
            tracker.endpoints.hkpost = url;
        }
        if let Some(url) = lookup("PARCEL_DPDUK_PARCEL_URL") {
            tracker.endpoints.dpduk_parcel = url;
        }
        if let Some(url) = lookup("PARCEL_DPDUK_DELIVERY_URL") {
            tracker.endpoints.dpduk_delivery = url;
        }

        Ok(Self {
            carrier,
            tracking_number: tracking_number.trim().to_string(),
            tracker,
            log_level: lookup("PARCEL_LOG_LEVEL").unwrap_or_else(|| "warn".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.tracking_number.is_empty() {
            anyhow::bail!("Tracking number cannot be empty");
        }

        if !(1..=300).contains(&self.tracker.transport.timeout_secs) {
            anyhow::bail!(
                "PARCEL_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                self.tracker.transport.timeout_secs
            );
        }

        self.tracker.validate()?;

        parse_level(&self.log_level).with_context(|| {
            format!(
                "PARCEL_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            )
        })?;

        Ok(())
    }
}

fn parse_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => anyhow::bail!("unknown log level: {}", other),
    }
}

fn carrier_names() -> String {
    Carrier::ALL
        .iter()
        .map(|carrier| carrier.slug())
        .collect::<Vec<_>>()
        .join(", ")
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return TrackExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return TrackExitCode::ConfigError.into();
    }

    let log_level = parse_level(&config.log_level).unwrap_or(Level::WARN);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return TrackExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return TrackExitCode::TrackingFailed.into();
        }
    };

    rt.block_on(run(config)).into()
}

/// Build the dispatcher, track once, print the outcome
async fn run(config: Config) -> TrackExitCode {
    let dispatcher = match build_dispatcher(&config.tracker) {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            eprintln!("Startup error: {:#}", e);
            return TrackExitCode::ConfigError;
        }
    };

    match dispatcher
        .track(config.carrier, &config.tracking_number)
        .await
    {
        Ok(result) => match serde_json::to_string_pretty(&result) {
            Ok(json) => {
                println!("{}", json);
                TrackExitCode::Success
            }
            Err(e) => {
                eprintln!("Failed to render result: {}", e);
                TrackExitCode::TrackingFailed
            }
        },
        Err(e) if e.is_record_not_found() => {
            eprintln!("{}", e);
            TrackExitCode::RecordNotFound
        }
        Err(e) => {
            eprintln!("{}", e);
            TrackExitCode::TrackingFailed
        }
    }
}

fn build_dispatcher(tracker: &TrackerConfig) -> Result<Dispatcher> {
    let registry = CourierRegistry::new();

    #[cfg(feature = "usps")]
    parcel_courier_usps::register(&registry);

    #[cfg(feature = "hkpost")]
    parcel_courier_hkpost::register(&registry);

    #[cfg(feature = "dpduk")]
    parcel_courier_dpduk::register(&registry);

    debug!("Registered couriers: {:?}", registry.list_couriers());

    let transport = ReqwestTransport::new(&tracker.transport)?;
    let dispatcher = Dispatcher::from_registry(&registry, tracker, Arc::new(transport))?;
    Ok(dispatcher)
}
