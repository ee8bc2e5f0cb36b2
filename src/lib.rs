pub mod config; // Configuration management
pub mod daylight; // Sunrise/sunset gate
pub mod error; // Error types
pub mod goodwe; // GoodWe UDP protocol implementation
pub mod location; // Geocoding and location cache
pub mod options; // Command line options parsing
pub mod prelude; // Common imports and types
pub mod pvoutput; // PVOutput upload

// Get the package version from Cargo.toml
const CARGO_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

use crate::daylight::SunTimes;
use crate::prelude::*;
use crate::pvoutput::{PvOutput, Reading};
use std::io::Write;

/// How a run ended when nothing went wrong.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// outside daylight hours, inverter not contacted
    Skipped,
    /// debug mode, reading printed instead of uploaded
    Printed,
    Uploaded,
}

/// Sets up env_logger on stderr. `RUST_LOG` takes precedence over `level`.
pub fn init_logging(level: &str) {
    if let Err(e) = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.level(),
                record.module_path().unwrap_or(""),
                record.args()
            )
        })
        .write_style(env_logger::WriteStyle::Never)
        .target(env_logger::Target::Stderr)
        .try_init()
    {
        error!("Failed to initialise logging: {}", e);
    }
}

/// One complete run: daylight gate, inverter read, upload.
pub async fn app(config: Config) -> Result<Outcome> {
    info!("goodwe-bridge {} starting", CARGO_PKG_VERSION);

    if config.ignore_daylight {
        debug!("daylight check disabled");
    } else if !is_daylight(&config).await? {
        return Ok(Outcome::Skipped);
    }

    let snapshot = Client::new(&config.inverter)
        .fetch_snapshot(config.inverter.attempts())
        .await
        .with_context(|| {
            format!(
                "failed to read inverter at {}:{}",
                config.inverter.host(),
                config.inverter.port()
            )
        })?;

    if config.debug {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(Outcome::Printed);
    }

    let reading = Reading::from_snapshot(&snapshot, chrono::Local::now());
    PvOutput::new(config.pvoutput.clone())
        .context("failed to create PVOutput client")?
        .upload(&reading)
        .await
        .context("upload to PVOutput failed")?;

    Ok(Outcome::Uploaded)
}

async fn is_daylight(config: &Config) -> Result<bool> {
    let coordinates = location::resolve(&config.location)
        .await
        .with_context(|| format!("failed to resolve location {}", config.location.query()))?;

    let now = chrono::Local::now();
    let sun = SunTimes::for_date(coordinates.latitude, coordinates.longitude, now.date_naive());
    debug!("sun times for {:?}: {:?}", coordinates, sun);

    let daylight = sun.is_daylight(&now);
    if !daylight {
        info!("Running outside daylight hours, exiting");
    }
    Ok(daylight)
}
