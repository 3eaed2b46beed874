//! Bearer token acquisition with caching and endpoint failover.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::Mutex;

use super::decode_json;
use super::error::{RemoteError, RemoteResult};
use crate::config::AuthConfig;

/// Token response from an OAuth endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    deadline: Instant,
}

/// Acquires and caches the bearer token used by all imagery requests.
///
/// Endpoints are tried in their configured order; the first one that yields
/// a token wins, and a failing endpoint (non-success status, transport
/// failure, or a body without an access token) is skipped rather than
/// surfaced. The cached value is reused until its deadline passes; the
/// deadline is checked on each call, there is no background timer.
/// Concurrent callers share a single in-flight fetch because the cache lock
/// is held across it.
pub struct TokenBroker {
    http: reqwest::Client,
    config: AuthConfig,
    cache: Mutex<Option<CachedToken>>,
}

impl TokenBroker {
    pub fn new(http: reqwest::Client, config: AuthConfig) -> Self {
        Self {
            http,
            config,
            cache: Mutex::new(None),
        }
    }

    /// Return a valid bearer token, fetching one if the cache is empty or
    /// its deadline has passed.
    pub async fn acquire(&self) -> RemoteResult<String> {
        let mut cache = self.cache.lock().await;

        if let Some(cached) = cache.as_ref() {
            if Instant::now() < cached.deadline {
                return Ok(cached.value.clone());
            }
        }

        let (value, ttl) = self.fetch_from_any_endpoint().await?;
        *cache = Some(CachedToken {
            value: value.clone(),
            deadline: Instant::now() + ttl,
        });
        Ok(value)
    }

    /// Drop the cached token so the next `acquire` fetches a fresh one.
    pub async fn invalidate(&self) {
        *self.cache.lock().await = None;
    }

    async fn fetch_from_any_endpoint(&self) -> RemoteResult<(String, Duration)> {
        if self.config.token_endpoints.is_empty() {
            return Err(RemoteError::Configuration(
                "No token endpoints configured".to_string(),
            ));
        }

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        let mut last_failure = String::new();
        for endpoint in &self.config.token_endpoints {
            match self.fetch_token(endpoint, &params).await {
                Ok(response) if !response.access_token.is_empty() => {
                    return Ok((response.access_token, cache_ttl(response.expires_in)));
                }
                Ok(_) => {
                    log::warn!("Token endpoint {} answered without an access token", endpoint);
                    last_failure = format!("{}: response carried no access token", endpoint);
                }
                Err(e) => {
                    log::warn!("Token endpoint {} failed: {}", endpoint, e);
                    last_failure = format!("{}: {}", endpoint, e);
                }
            }
        }

        Err(RemoteError::Authentication(format!(
            "all token endpoints exhausted, last failure: {}",
            last_failure
        )))
    }

    async fn fetch_token(
        &self,
        endpoint: &str,
        params: &[(&str, &str); 3],
    ) -> RemoteResult<TokenResponse> {
        let response = self.http.post(endpoint).form(params).send().await?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<empty response>".to_string());

        if !status.is_success() {
            return Err(RemoteError::Service {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        decode_json(&body)
    }

    #[cfg(test)]
    pub(crate) async fn seed_cache(&self, value: &str, ttl: Duration) {
        *self.cache.lock().await = Some(CachedToken {
            value: value.to_string(),
            deadline: Instant::now() + ttl,
        });
    }
}

/// Cache lifetime for a token: the server TTL minus a safety margin, never
/// below 30 seconds. A missing TTL counts as one hour.
fn cache_ttl(expires_in: Option<u64>) -> Duration {
    Duration::from_secs(expires_in.unwrap_or(3600).saturating_sub(30).max(30))
}
