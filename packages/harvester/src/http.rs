//! HTTP client wrapper for downloading BOE XML documents.

use std::error::Error as _;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::config::{
    document_url, validate_document_id, FetchConfig, RetryPolicy, HTTP_TIMEOUT_SECS,
};
use crate::error::{HarvesterError, Result};

/// User agent string identifying this harvester.
const USER_AGENT: &str = concat!("boe-harvester/", env!("CARGO_PKG_VERSION"));

/// Error message fragments that identify transport-security failures.
const TLS_MARKERS: [&str; 4] = ["tls", "ssl", "certificate", "handshake"];

/// Anything that can hand back the XML text of a BOE document by ID.
///
/// The pipelines only see this trait, so they run unchanged against the
/// live site or against in-memory fixtures.
pub trait DocumentSource {
    /// Fetch the raw XML of the document with the given identifier.
    fn fetch(&self, id: &str) -> Result<String>;
}

/// Create a configured HTTP client.
pub fn create_client() -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Download a URL as text, pausing before every attempt.
///
/// The pause grows by `config.backoff_step` on each retry. Which failures
/// are retried is decided by `config.retry_policy`; a non-success status is
/// final unless the policy retries 5xx responses.
pub fn download_text(client: &Client, url: &str, config: &FetchConfig) -> Result<String> {
    let mut last_error: Option<String> = None;

    for attempt in 0..config.max_retries {
        let delay = config.delay_for_attempt(attempt);
        if !delay.is_zero() {
            tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, url, "Waiting before request");
            thread::sleep(delay);
        }

        match client.get(url).send() {
            Ok(response) => {
                let status = response.status();

                if status.is_server_error() && config.retry_policy == RetryPolicy::Transient {
                    tracing::warn!(
                        status = %status,
                        attempt = attempt + 1,
                        max_retries = config.max_retries,
                        "Server error, will retry"
                    );
                    last_error = Some(format!("Server error: {status}"));
                    continue;
                }

                if !status.is_success() {
                    return Err(HarvesterError::Status {
                        url: url.to_string(),
                        status: status.as_u16(),
                    });
                }

                return Ok(response.text()?);
            }
            Err(e) => {
                if is_retryable(&e, config.retry_policy) {
                    tracing::warn!(
                        error = %e,
                        attempt = attempt + 1,
                        max_retries = config.max_retries,
                        "Transport error, will retry"
                    );
                    last_error = Some(e.to_string());
                    continue;
                }
                return Err(HarvesterError::Http(e));
            }
        }
    }

    Err(HarvesterError::RetriesExhausted {
        attempts: config.max_retries,
        message: last_error.unwrap_or_else(|| "Unknown error".to_string()),
    })
}

fn is_retryable(error: &reqwest::Error, policy: RetryPolicy) -> bool {
    match policy {
        RetryPolicy::TlsOnly => is_tls_error(error),
        RetryPolicy::Transient => is_tls_error(error) || error.is_connect() || error.is_timeout(),
    }
}

/// reqwest has no TLS error kind, so walk the source chain instead.
///
/// A `rustls::Error` anywhere in the chain, either directly or wrapped in an
/// `io::Error`, is a TLS failure. Messages are only checked as a fallback.
fn is_tls_error(error: &reqwest::Error) -> bool {
    let mut current: Option<&(dyn std::error::Error + 'static)> = error.source();
    while let Some(err) = current {
        if is_rustls_error(err) || mentions_tls(&err.to_string()) {
            return true;
        }
        current = err.source();
    }
    false
}

fn is_rustls_error(err: &(dyn std::error::Error + 'static)) -> bool {
    if err.is::<rustls::Error>() {
        return true;
    }
    err.downcast_ref::<std::io::Error>()
        .and_then(|io| io.get_ref())
        .is_some_and(|inner| inner.is::<rustls::Error>())
}

fn mentions_tls(message: &str) -> bool {
    let message = message.to_lowercase();
    TLS_MARKERS.iter().any(|marker| message.contains(marker))
}

/// Live BOE document source.
pub struct BoeClient {
    client: Client,
    config: FetchConfig,
}

impl BoeClient {
    /// Create a client for the given fetch settings.
    pub fn new(config: FetchConfig) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            config,
        })
    }
}

impl DocumentSource for BoeClient {
    fn fetch(&self, id: &str) -> Result<String> {
        validate_document_id(id)?;
        let url = document_url(&self.config.base_url, id);
        tracing::debug!(id, url = %url, "Fetching document");
        download_text(&self.client, &url, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client() {
        let client = create_client();
        assert!(client.is_ok());
    }

    #[test]
    fn test_mentions_tls() {
        assert!(mentions_tls("received fatal alert: HandshakeFailure"));
        assert!(mentions_tls("invalid peer certificate: UnknownIssuer"));
        assert!(mentions_tls("SSL routines::unexpected eof while reading"));
        assert!(!mentions_tls("connection refused"));
        assert!(!mentions_tls("operation timed out"));
    }

    #[test]
    fn test_rustls_error_detected_by_type() {
        let direct = rustls::Error::InvalidMessage(rustls::InvalidMessage::InvalidContentType);
        assert!(!mentions_tls(&direct.to_string()));
        assert!(is_rustls_error(&direct));

        let wrapped = std::io::Error::new(std::io::ErrorKind::InvalidData, direct);
        assert!(is_rustls_error(&wrapped));

        let plain = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(!is_rustls_error(&plain));
    }

    #[test]
    fn test_fetch_rejects_malformed_id() {
        let client = BoeClient::new(FetchConfig::default()).unwrap();
        let err = client.fetch("../etc/passwd").unwrap_err();
        assert!(matches!(err, HarvesterError::InvalidDocumentId(_)));
    }
}
