//! Fetch behaviour against a mock BOE server.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use boe_harvester::config::{FetchConfig, RetryPolicy};
use boe_harvester::error::HarvesterError;
use boe_harvester::http::{BoeClient, DocumentSource};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SUMMARY_ID: &str = "BOE-S-20190531";

fn fast_config(base_url: &str) -> FetchConfig {
    FetchConfig::default()
        .with_base_url(base_url)
        .with_request_delay(Duration::ZERO)
        .with_backoff_step(Duration::ZERO)
}

/// The blocking client must not run on the async runtime's threads.
async fn fetch(config: FetchConfig, id: &'static str) -> Result<String, HarvesterError> {
    tokio::task::spawn_blocking(move || BoeClient::new(config)?.fetch(id))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_fetch_returns_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/diario_boe/xml.php"))
        .and(query_param("id", SUMMARY_ID))
        .respond_with(ResponseTemplate::new(200).set_body_string("<sumario><diario/></sumario>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let body = fetch(fast_config(&mock_server.uri()), SUMMARY_ID)
        .await
        .unwrap();
    assert_eq!(body, "<sumario><diario/></sumario>");
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/diario_boe/xml.php"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = fast_config(&mock_server.uri()).with_retry_policy(RetryPolicy::Transient);
    let err = fetch(config, SUMMARY_ID).await.unwrap_err();
    assert!(matches!(err, HarvesterError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_server_error_final_under_tls_only() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = fetch(fast_config(&mock_server.uri()), SUMMARY_ID)
        .await
        .unwrap_err();
    assert!(matches!(err, HarvesterError::Status { status: 503, .. }));
}

#[tokio::test]
async fn test_server_error_retried_under_transient() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = fast_config(&mock_server.uri())
        .with_retry_policy(RetryPolicy::Transient)
        .with_max_retries(3);
    let err = fetch(config, SUMMARY_ID).await.unwrap_err();
    assert!(matches!(err, HarvesterError::RetriesExhausted { attempts: 3, .. }));
}

#[tokio::test]
async fn test_recovers_after_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<documento/>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = fast_config(&mock_server.uri()).with_retry_policy(RetryPolicy::Transient);
    let body = fetch(config, "BOE-A-2019-8117").await.unwrap();
    assert_eq!(body, "<documento/>");
}

#[test]
fn test_connection_refused_not_retried_under_tls_only() {
    let config = fast_config("http://127.0.0.1:1");
    let err = BoeClient::new(config).unwrap().fetch(SUMMARY_ID).unwrap_err();
    assert!(matches!(err, HarvesterError::Http(_)));
}

#[test]
fn test_connection_refused_retried_under_transient() {
    let config = fast_config("http://127.0.0.1:1")
        .with_retry_policy(RetryPolicy::Transient)
        .with_max_retries(2);
    let err = BoeClient::new(config).unwrap().fetch(SUMMARY_ID).unwrap_err();
    assert!(matches!(err, HarvesterError::RetriesExhausted { attempts: 2, .. }));
}

/// Accept connections forever, answering every one in plain HTTP.
///
/// A TLS client talking to this server fails inside rustls with a corrupt
/// record error whose message does not mention TLS.
fn spawn_plain_http_server() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut hello = [0u8; 512];
            let _ = stream.read(&mut hello);
            let _ = stream.write_all(b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n");
        }
    });
    port
}

#[test]
fn test_tls_protocol_error_retried_under_tls_only() {
    let port = spawn_plain_http_server();
    let config = fast_config(&format!("https://127.0.0.1:{port}")).with_max_retries(3);
    assert_eq!(config.retry_policy, RetryPolicy::TlsOnly);

    let err = BoeClient::new(config).unwrap().fetch(SUMMARY_ID).unwrap_err();
    assert!(
        matches!(err, HarvesterError::RetriesExhausted { attempts: 3, .. }),
        "unexpected error: {err}"
    );
}
