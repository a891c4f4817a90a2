//! Shared, pooled HTTP client (C2): one `reqwest::Client` builder policy for
//! the whole process, plus a thin retry wrapper that honors `Retry-After` on
//! 429/503 with exponential backoff. Grounded on the teacher's
//! `IndexerDownloader` client-builder pattern, generalized from a one-off
//! GitHub client into the shared fetch surface every plugin/validator/
//! resolver borrows.

use std::time::Duration;

use crate::config::HttpConfig;
use crate::error::{Error, Result};

/// Number of attempts for a retryable (5xx/transport) failure, including the
/// first try. §4.4: "3 tries, base 2.0s".
const MAX_ATTEMPTS: u32 = 3;
const BASE_BACKOFF: Duration = Duration::from_secs(2);

/// Builds a `reqwest::Client` honoring the configured timeout, UA and
/// redirect policy. One instance is shared process-wide by non-plugin
/// callers (validator, resolvers); HTTP-mode plugins build their own via the
/// same function so each plugin's connection pool stays independent (§5).
pub fn build_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(&config.user_agent);

    builder = if config.follow_redirects {
        builder.redirect(reqwest::redirect::Policy::limited(10))
    } else {
        builder.redirect(reqwest::redirect::Policy::none())
    };

    builder.build().map_err(Error::Transport)
}

/// Body returned by a successful fetch. Kept as raw bytes; callers parse
/// text/JSON/HTML as needed so this module stays format-agnostic.
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub headers: reqwest::header::HeaderMap,
}

impl FetchResponse {
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.clone()).map_err(|e| Error::Parse(e.to_string()))
    }
}

/// GET with the retry-transport policy: 5xx and transport errors are retried
/// up to `MAX_ATTEMPTS` with exponential backoff (honoring `Retry-After` when
/// present); 4xx is terminal (§4.2 "safe fetch").
pub async fn get_with_retry(client: &reqwest::Client, url: &str) -> Result<FetchResponse> {
    fetch_with_retry(client, reqwest::Method::GET, url, None).await
}

pub async fn post_with_retry(
    client: &reqwest::Client,
    url: &str,
    body: Vec<u8>,
) -> Result<FetchResponse> {
    fetch_with_retry(client, reqwest::Method::POST, url, Some(body)).await
}

async fn fetch_with_retry(
    client: &reqwest::Client,
    method: reqwest::Method,
    url: &str,
    body: Option<Vec<u8>>,
) -> Result<FetchResponse> {
    let mut attempt = 0;
    loop {
        attempt += 1;

        let mut request = client.request(method.clone(), url);
        if let Some(ref b) = body {
            request = request.body(b.clone());
        }

        let outcome = request.send().await;

        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                if attempt >= MAX_ATTEMPTS || !is_retryable_transport(&err) {
                    return Err(classify_transport(err));
                }
                tracing::warn!(url, attempt, error = %err, "transport error, retrying");
                tokio::time::sleep(backoff_for(attempt)).await;
                continue;
            }
        };

        let status = response.status();

        if status.is_success() || status.is_redirection() {
            let headers = response.headers().clone();
            let body = response.bytes().await.map_err(Error::Transport)?.to_vec();
            return Ok(FetchResponse { status: status.as_u16(), body, headers });
        }

        if status.as_u16() == 429 || status.is_server_error() {
            if attempt >= MAX_ATTEMPTS {
                let retry_body = response.text().await.unwrap_or_default();
                return Err(Error::Http5xx { status: status.as_u16(), body: retry_body });
            }
            let delay = retry_after(&response).unwrap_or_else(|| backoff_for(attempt));
            tracing::warn!(url, attempt, status = status.as_u16(), "retryable status, retrying");
            tokio::time::sleep(delay).await;
            continue;
        }

        // 4xx is terminal: no retry.
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Http4xx { status: status.as_u16(), body });
    }
}

fn is_retryable_transport(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

fn classify_transport(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Deadline
    } else {
        Error::Transport(err)
    }
}

fn retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn backoff_for(attempt: u32) -> Duration {
    BASE_BACKOFF * 2u32.pow(attempt.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_exponentially_from_base() {
        assert_eq!(backoff_for(1), Duration::from_secs(2));
        assert_eq!(backoff_for(2), Duration::from_secs(4));
        assert_eq!(backoff_for(3), Duration::from_secs(8));
    }

    #[test]
    fn build_client_honors_config() {
        let config = HttpConfig::default();
        let client = build_client(&config);
        assert!(client.is_ok());
    }
}
