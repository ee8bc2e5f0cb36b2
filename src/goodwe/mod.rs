pub mod client;
pub mod crc;
pub mod decode;
pub mod frame;
pub mod snapshot;

pub use client::{Client, Transport, UdpTransport};
pub use frame::Model;
pub use snapshot::{AcPhase, DcChannel, Status, TelemetrySnapshot};
