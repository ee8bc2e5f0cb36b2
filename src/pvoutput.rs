use crate::config;
use crate::error::UploadError;
use crate::goodwe::TelemetrySnapshot;

use chrono::{DateTime, Local};
use log::{debug, info};
use std::time::Duration;

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(5);

/// One addstatus record.
#[derive(Clone, Debug, PartialEq)]
pub struct Reading {
    pub date: DateTime<Local>,
    /// W
    pub power: i64,
    /// Wh
    pub energy: i64,
    pub voltage: Option<i64>,
    /// degrees Celsius
    pub temperature: Option<i64>,
}

impl Reading {
    pub fn from_snapshot(snapshot: &TelemetrySnapshot, date: DateTime<Local>) -> Self {
        let positive = |v: i64| (v > 0).then_some(v);

        Self {
            date,
            power: snapshot.ac_power.trunc() as i64,
            energy: (snapshot.yield_today * 1000.0).round() as i64,
            voltage: positive(snapshot.ac_phases[0].voltage.trunc() as i64),
            temperature: positive(snapshot.temperature.trunc() as i64),
        }
    }

    pub fn form(&self) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("d", self.date.format("%Y%m%d").to_string()),
            ("t", self.date.format("%H:%M").to_string()),
            ("v1", self.energy.to_string()),
            ("v2", self.power.to_string()),
        ];
        if let Some(t) = self.temperature {
            form.push(("v5", t.to_string()));
        }
        if let Some(v) = self.voltage {
            form.push(("v6", v.to_string()));
        }
        form
    }
}

pub struct PvOutput {
    config: config::PvOutput,
    client: reqwest::Client,
}

impl PvOutput {
    pub fn new(config: config::PvOutput) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder().timeout(UPLOAD_TIMEOUT).build()?;
        Ok(Self { config, client })
    }

    pub async fn upload(&self, reading: &Reading) -> Result<(), UploadError> {
        let form = reading.form();
        debug!("posting {:?} to {}", form, self.config.url());

        let response = self
            .client
            .post(self.config.url())
            .header("X-Pvoutput-Apikey", self.config.api_key())
            .header("X-Pvoutput-SystemId", self.config.system_id())
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Status { status, body });
        }

        info!(
            "uploaded {} W / {} Wh to PVOutput system {}",
            reading.power,
            reading.energy,
            self.config.system_id()
        );
        Ok(())
    }
}
