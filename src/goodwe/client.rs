use crate::config;
use crate::error::ExchangeError;
use crate::goodwe::frame::{self, Model};
use crate::goodwe::snapshot::TelemetrySnapshot;

use async_trait::async_trait;
use log::{debug, error, warn};
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;

/// Larger than any valid response, so oversized datagrams fail the length
/// check rather than being cut down to it.
const RECV_BUFFER_SIZE: usize = 1024;

// Transport {{{
/// One request datagram out, one response datagram back.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn exchange(&self, request: &[u8]) -> Result<Vec<u8>, ExchangeError>;
}

#[derive(Clone, Debug)]
pub struct UdpTransport {
    host: String,
    port: u16,
    timeout: Duration,
}

impl UdpTransport {
    pub fn new(host: &str, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.to_string(),
            port,
            timeout,
        }
    }

    async fn resolve(&self) -> Result<SocketAddr, ExchangeError> {
        let lookup = tokio::net::lookup_host((self.host.as_str(), self.port));
        let mut addrs = bounded("resolve", self.timeout, lookup).await?;
        addrs.next().ok_or_else(|| {
            ExchangeError::Socket(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{}:{} did not resolve", self.host, self.port),
            ))
        })
    }
}

/// Runs one socket operation under `after`.
async fn bounded<T>(
    what: &str,
    after: Duration,
    op: impl Future<Output = std::io::Result<T>>,
) -> Result<T, ExchangeError> {
    timeout(after, op)
        .await
        .map_err(|_| ExchangeError::timeout(what, after))?
        .map_err(ExchangeError::from)
}

#[async_trait]
impl Transport for UdpTransport {
    async fn exchange(&self, request: &[u8]) -> Result<Vec<u8>, ExchangeError> {
        let addr = self.resolve().await?;
        let local: SocketAddr = if addr.is_ipv4() {
            ([0u8; 4], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };

        // the socket is dropped, and so closed, on every return path
        let socket = UdpSocket::bind(local).await?;
        socket.connect(addr).await?;

        bounded("send", self.timeout, socket.send(request)).await?;

        let mut buf = vec![0u8; RECV_BUFFER_SIZE];
        let len = bounded("receive", self.timeout, socket.recv(&mut buf)).await?;
        buf.truncate(len);

        debug!("received {} bytes from {}", len, addr);
        Ok(buf)
    }
}
// }}}

// Client {{{
pub struct Client<T: Transport = UdpTransport> {
    transport: T,
    model: Model,
    retry_delay: Duration,
}

impl Client<UdpTransport> {
    pub fn new(inverter: &config::Inverter) -> Self {
        let transport = UdpTransport::new(inverter.host(), inverter.port(), inverter.timeout());
        Self::with_transport(transport, inverter.retry_delay())
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(transport: T, retry_delay: Duration) -> Self {
        Self {
            transport,
            model: Model::default(),
            retry_delay,
        }
    }

    pub fn model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs up to `max_attempts` full exchanges, waiting `retry_delay`
    /// between them. Every per-attempt failure is retried the same way.
    pub async fn fetch_snapshot(
        &self,
        max_attempts: usize,
    ) -> Result<TelemetrySnapshot, ExchangeError> {
        for attempt in 1..=max_attempts {
            match self.attempt().await {
                Ok(snapshot) => {
                    debug!("inverter reading received on attempt {}/{}", attempt, max_attempts);
                    return Ok(snapshot);
                }
                Err(e) => {
                    warn!("attempt {}/{} failed: {}", attempt, max_attempts, e);
                    if attempt < max_attempts {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        error!("giving up after {} attempts", max_attempts);
        Err(ExchangeError::Exhausted {
            attempts: max_attempts,
        })
    }

    async fn attempt(&self) -> Result<TelemetrySnapshot, ExchangeError> {
        let request = self.model.request();
        debug!("TX {:02x?}", request);

        let response = self.transport.exchange(&request).await?;
        let payload = frame::verify_response(&response)?;
        frame::parse_with(self.model, payload)
    }
}
// }}}
