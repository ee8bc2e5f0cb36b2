#![allow(dead_code)]

use goodwe_bridge::config;
use goodwe_bridge::goodwe::{crc, frame};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::UdpSocket;

pub fn common_setup() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub struct Factory;
impl Factory {
    /// A payload with every field populated with distinct values.
    pub fn payload() -> Vec<u8> {
        let mut p = vec![0u8; frame::PAYLOAD_LEN];
        let mut put = |offset: usize, v: u16| p[offset..offset + 2].copy_from_slice(&v.to_be_bytes());

        // pv strings: 351.2 V/4.1 A, 348.9 V/3.9 A, then two idle strings
        put(9, 3512);
        put(11, 41);
        put(13, 3489);
        put(15, 39);
        put(17, 0);
        put(19, 0);
        put(21, 12);
        put(23, 0);
        // grid phases
        put(39, 2317);
        put(41, 2325);
        put(43, 2309);
        put(45, 42);
        put(47, 43);
        put(49, 41);
        put(51, 5001);
        put(53, 5002);
        put(55, 4999);
        put(59, 2875);
        put(61, 1);
        put(85, 419);
        put(91, 123);
        put(99, 14210);

        p[93..97].copy_from_slice(&20391u32.to_be_bytes());
        p
    }

    pub fn response(payload: &[u8]) -> Vec<u8> {
        let mut r = frame::HEADER.to_vec();
        r.extend_from_slice(&crc::with_checksum(payload));
        r
    }

    pub fn inverter(addr: SocketAddr) -> config::Inverter {
        config::Inverter {
            host: addr.ip().to_string(),
            port: addr.port(),
            attempts: Some(3),
            timeout_ms: Some(200),
            retry_delay_ms: Some(50),
        }
    }

    pub fn config(addr: SocketAddr, pvoutput_url: &str) -> config::Config {
        config::Config {
            inverter: Self::inverter(addr),
            pvoutput: config::PvOutput {
                api_key: "secret".to_string(),
                system_id: "4242".to_string(),
                url: Some(pvoutput_url.to_string()),
            },
            location: config::Location {
                query: "Utrecht, Netherlands".to_string(),
                cache_file: None,
                geocoder_url: None,
            },
            loglevel: "debug".to_string(),
            debug: false,
            ignore_daylight: true,
        }
    }
}

/// Fake inverter on loopback. Answers the n-th request with `replies[n]`
/// (the last entry repeats); `None` means stay silent.
pub struct FakeInverter {
    pub addr: SocketAddr,
    pub requests: Arc<AtomicUsize>,
}

impl FakeInverter {
    pub async fn start(replies: Vec<Option<Vec<u8>>>) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        let requests = Arc::new(AtomicUsize::new(0));

        let counter = requests.clone();
        tokio::spawn(async move {
            let mut buf = [0u8; 64];
            loop {
                let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
                    break;
                };
                assert_eq!(&buf[..len], &[0x7F, 0x03, 0x75, 0x94, 0x00, 0x49, 0xD5, 0xC2]);

                let n = counter.fetch_add(1, Ordering::SeqCst);
                let reply = replies.get(n).or(replies.last()).cloned().flatten();
                if let Some(reply) = reply {
                    let _ = socket.send_to(&reply, peer).await;
                }
            }
        });

        Self { addr, requests }
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}
