//! Shared helpers for wiremock-backed integration tests

#![allow(dead_code)]

use std::io::Write;
use std::time::Duration;

use flate2::write::GzEncoder;
use flate2::Compression;
use strata_client::{Client, ClientConfig, ClientConfigBuilder};
use wiremock::MockServer;

/// Install a fmt subscriber once so `RUST_LOG` works in tests.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// A client pointed at the mock server, with millisecond retry timings so
/// backoff schedules run in test time.
pub fn test_client(server: &MockServer) -> Client {
    client_with(server, |builder| builder)
}

/// Same as [`test_client`] with extra configuration applied on top.
pub fn client_with(
    server: &MockServer,
    tweak: impl FnOnce(ClientConfigBuilder) -> ClientConfigBuilder,
) -> Client {
    let (host, port) = server_authority(server);
    let builder = ClientConfig::builder()
        .host(host.clone())
        .port(port)
        .use_tls(false)
        .api_key("1/testkey")
        .import_host(format!("{host}:{port}"))
        .retry_base_delay(Duration::from_millis(10))
        .max_cumulative_retry_delay(Duration::from_millis(500));
    Client::with_config(tweak(builder).build()).expect("client should build")
}

fn server_authority(server: &MockServer) -> (String, u16) {
    let uri = server.uri();
    let authority = uri.strip_prefix("http://").expect("mock server speaks plain http");
    let (host, port) = authority.split_once(':').expect("mock server authority has a port");
    (host.to_string(), port.parse().expect("valid port"))
}

/// Encode msgpack values back to back, the way result bodies arrive.
pub fn pack(values: &[rmpv::Value]) -> Vec<u8> {
    let mut buf = Vec::new();
    for value in values {
        rmpv::encode::write_value(&mut buf, value).expect("encode msgpack");
    }
    buf
}

/// A `[int, str, float]` row, the shape used across result fixtures.
pub fn row(a: i64, b: &str, c: f64) -> rmpv::Value {
    rmpv::Value::Array(vec![rmpv::Value::from(a), rmpv::Value::from(b), rmpv::Value::from(c)])
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).expect("gzip write");
    enc.finish().expect("gzip finish")
}
