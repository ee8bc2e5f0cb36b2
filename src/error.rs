use thiserror::Error;

/// Failures of a single inverter exchange, or of the whole retry loop.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// connect/send/receive failure, timeouts included
    #[error("socket error: {0}")]
    Socket(#[from] std::io::Error),

    /// wrong datagram length or header bytes
    #[error("framing error: {0}")]
    Framing(String),

    #[error("CRC mismatch - got {got:02x?}, expected {expected:02x?}")]
    Integrity { expected: [u8; 2], got: [u8; 2] },

    /// frame decoded but the values are physically impossible
    #[error("unrealistic values: {0}")]
    Validation(String),

    #[error("failed to get data after {attempts} attempts")]
    Exhausted { attempts: usize },
}

impl ExchangeError {
    /// Whether this failure only condemns the current attempt.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::Exhausted { .. })
    }

    pub(crate) fn timeout(what: &str, after: std::time::Duration) -> Self {
        Self::Socket(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            format!("{} timed out after {}ms", what, after.as_millis()),
        ))
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("PVOutput rejected upload: {status} {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("location cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("location cache is not valid JSON: {0}")]
    Cache(#[from] serde_json::Error),

    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("location not found: {0}")]
    NotFound(String),

    #[error("geocoder returned unparsable coordinate {0:?}")]
    BadCoordinate(String),
}
