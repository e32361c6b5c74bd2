//! Integration tests for the HTTP transport against a wiremock server
//!
//! **Coverage:**
//! - Retry schedule: 5xx then success on GET; exhaustion surfaces the
//!   last response; zero ceiling disables retrying
//! - POST retry gating via `retry_post_requests`
//! - No retry once a response is being streamed
//! - Request headers: Authorization, Date, User-Agent, Accept-Encoding
//! - PUT one-shot semantics: octet-stream body, explicit length, no retry
//! - Transparent decompression of buffered GET bodies

mod support;

use std::time::{Duration, Instant};

use strata_client::ClientError;
use wiremock::matchers::{header, header_exists, headers, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::{client_with, gzip, test_client};

/// Validates the GET retry schedule for transient server errors.
///
/// Two 500s followed by a 200 must resolve to a successful call, with
/// exactly three requests hitting the server.
#[tokio::test]
async fn test_get_retries_5xx_until_success() {
    support::init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/database/list"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .with_priority(1)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/database/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "databases": [{"name": "sample_db"}]
        })))
        .with_priority(5)
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let databases = client.list_databases().await.expect("call should succeed after retries");
    assert_eq!(databases.len(), 1);
    assert_eq!(databases[0].name, "sample_db");
}

/// Validates that an exhausted retry budget surfaces the last 5xx as an
/// API error instead of a transport error.
#[tokio::test]
async fn test_get_exhaustion_surfaces_last_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/database/list"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    // 10ms base against a 35ms ceiling: 10 + 20 fit, the next 40 does not,
    // so the call makes one initial attempt plus two retries.
    let client = client_with(&server, |b| {
        b.max_cumulative_retry_delay(Duration::from_millis(35))
    });
    let err = client.list_databases().await.expect_err("must fail");
    match err {
        ClientError::Api { status, .. } => assert_eq!(status, 503),
        other => panic!("expected Api error, got {other:?}"),
    }
    assert_eq!(server.received_requests().await.expect("requests").len(), 3);
}

/// Validates that a zero retry ceiling makes the first failure terminal.
#[tokio::test]
async fn test_zero_ceiling_disables_retries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/database/list"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with(&server, |b| b.max_cumulative_retry_delay(Duration::ZERO));
    assert!(client.list_databases().await.is_err());
}

/// Validates that POST is not retried unless `retry_post_requests` is set.
#[tokio::test]
async fn test_post_retry_is_opt_in() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/database/delete/stale_db"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    assert!(client.delete_database("stale_db").await.is_err());
    assert_eq!(server.received_requests().await.expect("requests").len(), 1);
}

/// Validates that an opted-in POST retries 5xx like a GET.
#[tokio::test]
async fn test_post_retries_when_enabled() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/database/create/fresh_db"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v3/database/create/fresh_db"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "database": "fresh_db"
        })))
        .with_priority(5)
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with(&server, |b| b.retry_post_requests(true));
    client.create_database("fresh_db").await.expect("retried POST should succeed");
}

/// Validates that a streaming GET is never retried: a 5xx on a result
/// fetch fails immediately with one request on the wire.
#[tokio::test]
async fn test_streaming_get_does_not_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/job/result/9"))
        .respond_with(ResponseTemplate::new(500).set_body_string("worker lost"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.job_result("9").await.expect_err("must fail");
    match err {
        ClientError::Api { status, message, .. } => {
            assert_eq!(status, 500);
            assert!(message.contains("worker lost"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert_eq!(server.received_requests().await.expect("requests").len(), 1);
}

/// Validates the standard request headers on GET calls.
///
/// The matchers double as assertions: a request without the expected
/// Authorization, Date, User-Agent, and Accept-Encoding headers falls
/// through to wiremock's 404 and the call fails.
#[tokio::test]
async fn test_get_carries_standard_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/database/list"))
        .and(header("authorization", "ApiKey 1/testkey"))
        .and(headers("accept-encoding", vec!["deflate", "gzip"]))
        .and(header_exists("date"))
        .and(header_exists("user-agent"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"databases": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with(&server, |b| b.max_cumulative_retry_delay(Duration::ZERO));
    client.list_databases().await.expect("headers should match");
}

/// Validates custom configured headers are attached to every request.
#[tokio::test]
async fn test_custom_headers_are_attached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/database/list"))
        .and(header("x-strata-account", "42"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"databases": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with(&server, |b| {
        b.header("X-Strata-Account", "42").max_cumulative_retry_delay(Duration::ZERO)
    });
    client.list_databases().await.expect("custom header should match");
}

/// Validates PUT upload semantics: octet-stream content type, explicit
/// content length, and no retry on failure.
#[tokio::test]
async fn test_put_is_octet_stream_and_never_retried() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v3/bulk_import/upload_part/session_01/part_a"))
        .and(header("content-type", "application/octet-stream"))
        .and(header("content-length", "11"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let body = bytes::Bytes::from_static(b"hello parts");
    let err = client
        .upload_part("session_01", "part_a", body, 11)
        .await
        .expect_err("500 must fail without retry");
    assert!(matches!(err, ClientError::Api { status: 500, .. }));
    assert_eq!(server.received_requests().await.expect("requests").len(), 1);
}

/// Validates that a buffered GET transparently inflates a gzip body.
#[tokio::test]
async fn test_buffered_get_inflates_gzip_bodies() {
    let server = MockServer::start().await;

    let body = serde_json::json!({"databases": [{"name": "compressed_db"}]}).to_string();
    Mock::given(method("GET"))
        .and(path("/v3/database/list"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-encoding", "gzip")
                .set_body_bytes(gzip(body.as_bytes())),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let databases = client.list_databases().await.expect("gzip body should decode");
    assert_eq!(databases[0].name, "compressed_db");
}

/// Validates that a connection-level fault is retried and eventually
/// reported as a network error. The target port is unroutable, so every
/// attempt fails at connect time.
#[tokio::test]
async fn test_connection_fault_becomes_network_error() {
    let server = MockServer::start().await;
    let client = client_with(&server, |b| {
        b.port(1) // nothing listens here
            .connect_timeout(Duration::from_millis(200))
            .max_cumulative_retry_delay(Duration::from_millis(20))
    });

    let start = Instant::now();
    let err = client.list_databases().await.expect_err("must fail");
    assert!(matches!(err, ClientError::Network(_)), "got {err:?}");
    // 10ms first delay fits the 20ms ceiling, so at least one retry ran.
    assert!(start.elapsed() >= Duration::from_millis(10));
}
