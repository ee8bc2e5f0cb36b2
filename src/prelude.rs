pub use anyhow::{anyhow, bail, Context, Result};
pub use log::{debug, error, info, trace, warn};

pub use crate::config::{self, Config};
pub use crate::error::{ExchangeError, LocationError, UploadError};
pub use crate::goodwe::{Client, Status, TelemetrySnapshot};
pub use crate::options::Options;
