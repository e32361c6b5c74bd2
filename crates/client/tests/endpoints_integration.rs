//! Integration tests for the resource endpoint families
//!
//! **Coverage:**
//! - Server status, up and down
//! - Database and table operations, including client-side name
//!   validation short-circuiting before any request
//! - Direct row import with the string-typed `elapsed_time` response
//! - Job listing against an older API revision payload
//! - Result record streaming, eager and push, over gzip msgpack
//! - Schedule, user, and access control families

mod support;

use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use strata_client::ClientError;
use strata_domain::{JobStatus, JobType};
use support::{gzip, pack, row, test_client};

/// Validates the server status call when the service is healthy.
#[tokio::test]
async fn test_server_status_reports_ok() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/system/server_status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ok"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    assert_eq!(client.server_status().await?, "ok");
    Ok(())
}

/// Validates that a failing status endpoint maps to a "down" message
/// rather than an error.
#[tokio::test]
async fn test_server_status_maps_5xx_to_down_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/system/server_status"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = support::client_with(&server, |b| {
        b.max_cumulative_retry_delay(std::time::Duration::ZERO)
    });
    assert_eq!(client.server_status().await.expect("status"), "Server is down (500)");
}

/// Validates that an invalid database name is rejected client-side with
/// no request reaching the server.
#[tokio::test]
async fn test_create_database_rejects_invalid_name_before_sending() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    let err = client.create_database("Invalid-Name").await.expect_err("must fail");
    assert!(matches!(err, ClientError::InvalidParameter(_)), "got {err:?}");
    assert!(server.received_requests().await.expect("requests").is_empty());
}

/// Validates a 409 on database creation classifies as AlreadyExists with
/// the service message.
#[tokio::test]
async fn test_create_database_conflict_is_already_exists() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/database/create/sample_db"))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "message": "Database sample_db already exists"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.create_database("sample_db").await.expect_err("must fail");
    match err {
        ClientError::AlreadyExists { message, .. } => {
            assert!(message.contains("already exists"));
        }
        other => panic!("expected AlreadyExists, got {other:?}"),
    }
}

/// Validates table listing fills in the owning database and parses the
/// embedded JSON schema string.
#[tokio::test]
async fn test_list_tables_fills_database_and_schema() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/table/list/sample_db"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "tables": [{
                "name": "www_access",
                "type": "log",
                "count": 120,
                "schema": "[[\"host\",\"string\"],[\"size\",\"long\"]]"
            }]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let tables = client.list_tables("sample_db").await.expect("tables");
    assert_eq!(tables[0].database.as_deref(), Some("sample_db"));
    let schema = tables[0].parsed_schema().expect("schema");
    assert_eq!(schema[0][0], "host");
}

/// Validates the direct import path: PUT on the data-plane host, with the
/// elapsed time arriving as a numeric string.
#[tokio::test]
async fn test_import_data_parses_string_elapsed_time() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v3/table/import/sample_db/www_access/msgpack.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "elapsed_time": "1.23"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let body = bytes::Bytes::from_static(b"packed rows");
    let elapsed = client
        .import_data("sample_db", "www_access", "msgpack.gz", body, 11)
        .await
        .expect("import");
    assert!((elapsed - 1.23).abs() < f64::EPSILON);
}

/// Validates that a failed import surfaces as an API error.
#[tokio::test]
async fn test_import_data_failure_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v3/table/import/sample_db/www_access/msgpack.gz"))
        .respond_with(ResponseTemplate::new(500).set_body_string("ingest unavailable"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client
        .import_data("sample_db", "www_access", "msgpack.gz", bytes::Bytes::new(), 0)
        .await
        .expect_err("must fail");
    assert!(matches!(err, ClientError::Api { status: 500, .. }), "got {err:?}");
}

/// Validates decoding a job listing from an older API revision: numeric
/// ids, null organization, no duration/num_records fields.
#[tokio::test]
async fn test_list_jobs_decodes_older_revision_payload() {
    let server = MockServer::start().await;

    let jobs: Vec<serde_json::Value> = (0..20)
        .map(|i| {
            serde_json::json!({
                "job_id": i,
                "type": "presto",
                "status": if i % 2 == 0 { "success" } else { "running" },
                "query": format!("select {i}"),
                "organization": null
            })
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/v3/job/list"))
        .and(query_param("status", "success"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "count": 20, "from": null, "to": null, "jobs": jobs
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let jobs = client.list_jobs(None, None, Some(JobStatus::Success)).await.expect("jobs");
    assert_eq!(jobs.len(), 20);
    assert_eq!(jobs[7].job_id, "7");
    assert_eq!(jobs[0].organization, None);
    assert_eq!(jobs[0].duration, None);
}

/// Validates issuing a job: form-encoded query, numeric job id in the
/// response, and the handle knowing its type without a fetch.
#[tokio::test]
async fn test_issue_job_returns_handle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/job/issue/presto/sample_db"))
        .and(body_string_contains("query=select"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "job_id": 12345
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut job = client
        .issue_job(JobType::Presto, "sample_db", "select count(1) from www_access", &[])
        .await
        .expect("issue");
    assert_eq!(job.job_id(), "12345");
    assert_eq!(job.job_type().await.expect("type"), Some(JobType::Presto));
}

/// Validates re-exporting a finished job's result: destination settings
/// as form fields, and a handle to the export job coming back.
#[tokio::test]
async fn test_result_export_returns_handle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/job/result_export/12345"))
        .and(body_string_contains("result=mysql%3A%2F%2Fexports%2Fsample_db"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "job_id": 12346
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut job = client
        .result_export("12345", &[("result", "mysql://exports/sample_db".to_string())])
        .await
        .expect("export");
    assert_eq!(job.job_id(), "12346");
    assert_eq!(job.job_type().await.expect("type"), Some(JobType::ResultExport));
}

/// Validates the result stream: gzip-compressed msgpack records decode
/// identically through the eager and push consumption modes.
#[tokio::test]
async fn test_job_result_eager_and_push_agree() {
    let server = MockServer::start().await;

    let rows = vec![row(1, "2", 3.0), row(4, "5", 6.0)];
    Mock::given(method("GET"))
        .and(path("/v3/job/result/123"))
        .and(query_param("format", "msgpack"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-encoding", "gzip")
                .set_body_bytes(gzip(&pack(&rows))),
        )
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server);

    let eager = client.job_result("123").await.expect("eager result");
    assert_eq!(eager, rows);

    let mut pushed = Vec::new();
    let mut last_progress = 0;
    let total = client
        .each_job_result("123", |value, received| {
            pushed.push(value);
            last_progress = received;
            Ok(())
        })
        .await
        .expect("push result");
    assert_eq!(pushed, rows);
    assert_eq!(total, last_progress);
    assert!(total > 0);
}

/// Validates tail decodes buffered msgpack rows.
#[tokio::test]
async fn test_tail_decodes_records() {
    let server = MockServer::start().await;

    let rows = vec![row(7, "8", 9.0)];
    Mock::given(method("GET"))
        .and(path("/v3/table/tail/sample_db/www_access"))
        .and(query_param("format", "msgpack"))
        .and(query_param("count", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(pack(&rows)))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let records = client.tail("sample_db", "www_access", 1).await.expect("tail");
    assert_eq!(records, rows);
}

/// Validates authentication: success returns the key, and a 400 is an
/// auth failure rather than a generic API error.
#[tokio::test]
async fn test_authenticate_maps_400_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/user/authenticate"))
        .and(body_string_contains("user=alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "alice", "apikey": "9/freshkey"
        })))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v3/user/authenticate"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "message": "invalid credentials"
        })))
        .with_priority(5)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let key = client.authenticate("alice", "hunter2").await.expect("auth");
    assert_eq!(key, "9/freshkey");

    let err = client.authenticate("bob", "wrong").await.expect_err("must fail");
    match err {
        ClientError::Auth { message, .. } => assert!(message.contains("invalid credentials")),
        other => panic!("expected Auth error, got {other:?}"),
    }
}

/// Validates the schedule family round trip: create, history with an
/// older revision payload, and an out-of-band run.
#[tokio::test]
async fn test_schedule_operations() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/schedule/create/nightly_rollup"))
        .and(body_string_contains("cron="))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "nightly_rollup", "start": "2026-08-26 00:00:00 UTC"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/schedule/history/nightly_rollup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "history": [
                {"job_id": 10, "type": "presto", "status": "success"},
                {"job_id": "11", "type": "presto", "status": "success",
                 "duration": 12, "num_records": 300}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v3/schedule/run/nightly_rollup/1756080000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jobs": [{"job_id": 77, "type": "presto", "scheduled_at": "2026-08-25 00:00:00 UTC"}]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);

    let params = [
        ("cron", "0 0 * * *".to_string()),
        ("query", "select count(1) from www_access".to_string()),
        ("database", "sample_db".to_string()),
    ];
    let start = client.create_schedule("nightly_rollup", &params).await.expect("create");
    assert_eq!(start.as_deref(), Some("2026-08-26 00:00:00 UTC"));

    let history = client.schedule_history("nightly_rollup", None, None).await.expect("history");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].duration, None);
    assert_eq!(history[1].num_records, Some(300));

    let jobs = client.run_schedule("nightly_rollup", 1_756_080_000, None).await.expect("run");
    assert_eq!(jobs[0].job_id, "77");
}

/// Validates the access control family, including the boolean permission
/// probe.
#[tokio::test]
async fn test_access_control_operations() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/acl/grant"))
        .and(body_string_contains("subject=analyst"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/acl/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_controls": [
                {"subject": "analyst", "action": "full_access",
                 "scope": "database:sample_db", "grant_option": false}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/acl/test"))
        .and(query_param("user", "analyst"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "permission": true
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    client
        .grant_access_control("analyst", "full_access", "database:sample_db", false)
        .await
        .expect("grant");
    let acls = client.list_access_controls().await.expect("list");
    assert_eq!(acls[0].subject, "analyst");
    assert!(client
        .test_access_control("analyst", "full_access", "database:sample_db")
        .await
        .expect("test"));
}

/// Validates that a 404 on a job lookup classifies as NotFound.
#[tokio::test]
async fn test_show_job_404_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/job/show/999"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "message": "No such job"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.show_job("999").await.expect_err("must fail");
    assert!(matches!(err, ClientError::NotFound { .. }), "got {err:?}");
}
