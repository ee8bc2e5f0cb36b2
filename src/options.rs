use clap::Parser;

/// GoodWe Bridge - reads a GoodWe inverter and uploads to PVOutput
#[derive(Debug, Default, Parser)]
#[clap(author, version)]
pub struct Options {
    /// Optional YAML config file; flags given here override its values
    #[clap(short = 'c', long = "config")]
    pub config_file: Option<String>,

    /// The PVOutput API key
    #[clap(short = 'a', long = "api-key", env = "API_KEY")]
    pub api_key: Option<String>,

    /// The PVOutput system ID
    #[clap(short = 's', long = "system-id", env = "SYSTEM_ID")]
    pub system_id: Option<String>,

    /// The IP address of the GoodWe inverter
    #[clap(short = 'i', long = "ip-address", env = "IP_ADDRESS")]
    pub ip_address: Option<String>,

    /// The UDP port the inverter listens on [default: 8899]
    #[clap(short = 'p', long = "port", env = "PORT")]
    pub port: Option<u16>,

    /// Location (city, country) used for the daylight check
    #[clap(short = 'l', long = "location", env = "LOCATION")]
    pub location: Option<String>,

    /// Number of exchange attempts before giving up [default: 3]
    #[clap(long = "attempts")]
    pub attempts: Option<usize>,

    /// Where geocoding results are cached [default: .location_cache.json]
    #[clap(long = "cache-file")]
    pub cache_file: Option<String>,

    /// Poll the inverter even outside daylight hours
    #[clap(long = "ignore-daylight")]
    pub ignore_daylight: bool,

    /// Show debug output and print the reading instead of uploading it
    #[clap(short = 'd', long = "debug")]
    pub debug: bool,
}

impl Options {
    pub fn new() -> Self {
        Self::parse()
    }
}
