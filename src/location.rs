use crate::config;
use crate::error::LocationError;

use log::{debug, error, info};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

static USER_AGENT: &str = concat!("goodwe-bridge/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

// LocationCache {{{
/// Geocoding results keyed by the location query, stored as `[lat, lon]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocationCache {
    entries: HashMap<String, [f64; 2]>,
}

impl LocationCache {
    /// A missing file is an empty cache.
    pub fn load(path: &Path) -> Result<Self, LocationError> {
        debug!("Loading location cache from {}", path.display());

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            entries: serde_json::from_str(&content)?,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), LocationError> {
        debug!("Saving location cache to {}", path.display());
        std::fs::write(path, serde_json::to_string_pretty(&self.entries)?)?;
        Ok(())
    }

    pub fn get(&self, query: &str) -> Option<Coordinates> {
        self.entries.get(query).map(|[latitude, longitude]| Coordinates {
            latitude: *latitude,
            longitude: *longitude,
        })
    }

    pub fn insert(&mut self, query: &str, c: Coordinates) {
        self.entries
            .insert(query.to_string(), [c.latitude, c.longitude]);
    }
} // }}}

// Geocoder {{{
#[derive(Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

pub struct Geocoder {
    url: String,
    client: reqwest::Client,
}

impl Geocoder {
    pub fn new(url: &str) -> Result<Self, LocationError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    pub async fn geocode(&self, query: &str) -> Result<Coordinates, LocationError> {
        info!("Geocoding location: {}", query);

        let places: Vec<Place> = self
            .client
            .get(&self.url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let place = places
            .into_iter()
            .next()
            .ok_or_else(|| LocationError::NotFound(query.to_string()))?;

        Ok(Coordinates {
            latitude: parse_coordinate(&place.lat)?,
            longitude: parse_coordinate(&place.lon)?,
        })
    }
}

fn parse_coordinate(s: &str) -> Result<f64, LocationError> {
    s.trim()
        .parse()
        .map_err(|_| LocationError::BadCoordinate(s.to_string()))
}
// }}}

/// Cached coordinates for the configured location, geocoding on a miss.
pub async fn resolve(config: &config::Location) -> Result<Coordinates, LocationError> {
    let path = Path::new(config.cache_file());
    let mut cache = LocationCache::load(path)?;

    if let Some(c) = cache.get(config.query()) {
        debug!("location cache hit for {}: {:?}", config.query(), c);
        return Ok(c);
    }

    let coordinates = Geocoder::new(config.geocoder_url())?
        .geocode(config.query())
        .await?;

    cache.insert(config.query(), coordinates);
    if let Err(e) = cache.save(path) {
        error!("Error saving location cache: {}", e);
    }

    Ok(coordinates)
}
