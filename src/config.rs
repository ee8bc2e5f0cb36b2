use crate::prelude::*;
use crate::options::Options;

use serde::Deserialize;
use std::time::Duration;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub inverter: Inverter,
    pub pvoutput: PvOutput,
    pub location: Location,

    #[serde(default = "Config::default_loglevel")]
    pub loglevel: String,

    /// print the reading instead of uploading it
    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub ignore_daylight: bool,
}

// Inverter {{{
#[derive(Clone, Debug, Deserialize)]
pub struct Inverter {
    pub host: String,
    #[serde(default = "Config::default_inverter_port")]
    pub port: u16,

    pub attempts: Option<usize>,
    pub timeout_ms: Option<u64>,
    pub retry_delay_ms: Option<u64>,
}
impl Inverter {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn attempts(&self) -> usize {
        self.attempts.unwrap_or(3)
    }

    /// Bounds each socket operation of one exchange attempt.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(1000))
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms.unwrap_or(1000))
    }
} // }}}

// PvOutput {{{
#[derive(Clone, Debug, Deserialize)]
pub struct PvOutput {
    pub api_key: String,
    pub system_id: String,
    pub url: Option<String>,
}
impl PvOutput {
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn system_id(&self) -> &str {
        &self.system_id
    }

    pub fn url(&self) -> &str {
        self.url
            .as_deref()
            .unwrap_or("https://pvoutput.org/service/r2/addstatus.jsp")
    }
} // }}}

// Location {{{
#[derive(Clone, Debug, Deserialize)]
pub struct Location {
    pub query: String,
    pub cache_file: Option<String>,
    pub geocoder_url: Option<String>,
}
impl Location {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn cache_file(&self) -> &str {
        self.cache_file.as_deref().unwrap_or(".location_cache.json")
    }

    pub fn geocoder_url(&self) -> &str {
        self.geocoder_url
            .as_deref()
            .unwrap_or("https://nominatim.openstreetmap.org/search")
    }
} // }}}

impl Config {
    /// Reads the YAML file. Validation happens once flags are layered on
    /// top, in `from_options`.
    pub fn new(file: &str) -> Result<Self> {
        info!("Reading configuration from {}", file);
        let content = std::fs::read_to_string(file)
            .map_err(|err| anyhow!("config.rs:error reading {}: {}", file, err))?;

        serde_yaml::from_str(&content)
            .map_err(|err| anyhow!("config.rs:error parsing {}: {}", file, err))
    }

    /// Builds the configuration from command line flags, layered over the
    /// YAML file when `--config` is given.
    pub fn from_options(options: &Options) -> Result<Self> {
        let mut config = match &options.config_file {
            Some(file) => Self::new(file)?,
            None => Self::from_flags(options)?,
        };

        if let Some(v) = &options.ip_address {
            config.inverter.host = v.clone();
        }
        if let Some(v) = options.port {
            config.inverter.port = v;
        }
        if let Some(v) = options.attempts {
            config.inverter.attempts = Some(v);
        }
        if let Some(v) = &options.api_key {
            config.pvoutput.api_key = v.clone();
        }
        if let Some(v) = &options.system_id {
            config.pvoutput.system_id = v.clone();
        }
        if let Some(v) = &options.location {
            config.location.query = v.clone();
        }
        if let Some(v) = &options.cache_file {
            config.location.cache_file = Some(v.clone());
        }
        if options.debug {
            config.debug = true;
            config.loglevel = "debug".to_string();
        }
        config.ignore_daylight |= options.ignore_daylight;

        config.validate()?;
        Ok(config)
    }

    fn from_flags(options: &Options) -> Result<Self> {
        fn required(value: &Option<String>, flag: &str) -> Result<String> {
            value
                .clone()
                .ok_or_else(|| anyhow!("config.rs:missing required option {}", flag))
        }

        Ok(Self {
            inverter: Inverter {
                host: required(&options.ip_address, "--ip-address")?,
                port: Self::default_inverter_port(),
                attempts: None,
                timeout_ms: None,
                retry_delay_ms: None,
            },
            pvoutput: PvOutput {
                api_key: required(&options.api_key, "--api-key")?,
                system_id: required(&options.system_id, "--system-id")?,
                url: None,
            },
            location: Location {
                query: required(&options.location, "--location")?,
                cache_file: None,
                geocoder_url: None,
            },
            loglevel: Self::default_loglevel(),
            debug: false,
            ignore_daylight: false,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.inverter.host.is_empty() {
            bail!("inverter.host cannot be empty");
        }
        if self.inverter.port == 0 {
            bail!("inverter.port must be between 1 and 65535");
        }
        if self.inverter.attempts() == 0 {
            bail!("inverter.attempts must be at least 1");
        }
        if self.inverter.timeout().is_zero() {
            return Err(anyhow!("config.rs:Invalid inverter timeout: 0"));
        }

        if self.pvoutput.api_key.is_empty() {
            bail!("pvoutput.api_key cannot be empty");
        }
        if self.pvoutput.system_id.is_empty() {
            bail!("pvoutput.system_id cannot be empty");
        }
        if let Err(e) = url::Url::parse(self.pvoutput.url()) {
            return Err(anyhow!("config.rs:Invalid PVOutput URL: {}", e));
        }

        if self.location.query.is_empty() {
            bail!("location.query cannot be empty");
        }
        if let Err(e) = url::Url::parse(self.location.geocoder_url()) {
            return Err(anyhow!("config.rs:Invalid geocoder URL: {}", e));
        }

        Ok(())
    }

    fn default_inverter_port() -> u16 {
        8899
    }

    fn default_loglevel() -> String {
        "warn".to_string()
    }
}
