//! Token broker behavior against live fake OAuth endpoints.
#![cfg(feature = "http-server")]

mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

use bloomwatch::config::AuthConfig;
use bloomwatch::remote::{RemoteError, TokenBroker};

fn auth_config(endpoints: Vec<String>) -> AuthConfig {
    AuthConfig {
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        token_endpoints: endpoints,
    }
}

/// Endpoint answering every POST with the given token; counts hits.
async fn token_endpoint(token: &'static str, hits: Arc<AtomicUsize>) -> String {
    let app = Router::new().route(
        "/token",
        post(move || {
            let hits = hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Json(json!({ "access_token": token, "expires_in": 3600 }))
            }
        }),
    );
    format!("{}/token", support::fake::spawn(app).await)
}

/// Endpoint answering every POST with the given error status; counts hits.
async fn failing_endpoint(status: StatusCode, hits: Arc<AtomicUsize>) -> String {
    let app = Router::new().route(
        "/token",
        post(move || {
            let hits = hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                (status, "no token for you")
            }
        }),
    );
    format!("{}/token", support::fake::spawn(app).await)
}

#[tokio::test]
async fn test_acquire_fails_over_to_second_endpoint() {
    let first_hits = Arc::new(AtomicUsize::new(0));
    let second_hits = Arc::new(AtomicUsize::new(0));
    let first = failing_endpoint(StatusCode::INTERNAL_SERVER_ERROR, first_hits.clone()).await;
    let second = token_endpoint("tok-second", second_hits.clone()).await;

    let broker = TokenBroker::new(reqwest::Client::new(), auth_config(vec![first, second]));

    let token = broker.acquire().await.unwrap();
    assert_eq!(token, "tok-second");
    assert_eq!(first_hits.load(Ordering::SeqCst), 1);
    assert_eq!(second_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_acquire_reuses_cached_token() {
    let hits = Arc::new(AtomicUsize::new(0));
    let endpoint = token_endpoint("tok-cached", hits.clone()).await;

    let broker = TokenBroker::new(reqwest::Client::new(), auth_config(vec![endpoint]));

    let first = broker.acquire().await.unwrap();
    let second = broker.acquire().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_acquires_share_one_fetch() {
    let hits = Arc::new(AtomicUsize::new(0));
    // Slow endpoint so all callers pile up behind the in-flight fetch.
    let app = Router::new().route(
        "/token",
        post({
            let hits = hits.clone();
            move || {
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    Json(json!({ "access_token": "tok-slow", "expires_in": 3600 }))
                }
            }
        }),
    );
    let endpoint = format!("{}/token", support::fake::spawn(app).await);

    let broker = Arc::new(TokenBroker::new(
        reqwest::Client::new(),
        auth_config(vec![endpoint]),
    ));

    let acquires = (0..8).map(|_| {
        let broker = broker.clone();
        async move { broker.acquire().await }
    });
    let tokens = futures::future::join_all(acquires).await;

    for token in tokens {
        assert_eq!(token.unwrap(), "tok-slow");
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_exhausted_endpoints_yield_authentication_error() {
    let first_hits = Arc::new(AtomicUsize::new(0));
    let second_hits = Arc::new(AtomicUsize::new(0));
    let first = failing_endpoint(StatusCode::INTERNAL_SERVER_ERROR, first_hits.clone()).await;
    let second = failing_endpoint(StatusCode::SERVICE_UNAVAILABLE, second_hits.clone()).await;

    let broker = TokenBroker::new(reqwest::Client::new(), auth_config(vec![first, second]));

    let err = broker.acquire().await.unwrap_err();
    match err {
        RemoteError::Authentication(message) => {
            assert!(message.contains("exhausted"), "unexpected message: {message}");
        }
        other => panic!("expected Authentication, got {other:?}"),
    }
    assert_eq!(first_hits.load(Ordering::SeqCst), 1);
    assert_eq!(second_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_empty_access_token_is_a_soft_failure() {
    let first_hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new().route(
        "/token",
        post({
            let hits = first_hits.clone();
            move || {
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Json(json!({ "access_token": "", "expires_in": 3600 }))
                }
            }
        }),
    );
    let first = format!("{}/token", support::fake::spawn(app).await);
    let second = token_endpoint("tok-fallback", Arc::new(AtomicUsize::new(0))).await;

    let broker = TokenBroker::new(reqwest::Client::new(), auth_config(vec![first, second]));

    let token = broker.acquire().await.unwrap();
    assert_eq!(token, "tok-fallback");
    assert_eq!(first_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_invalidate_forces_a_fresh_fetch() {
    let hits = Arc::new(AtomicUsize::new(0));
    let endpoint = token_endpoint("tok-fresh", hits.clone()).await;

    let broker = TokenBroker::new(reqwest::Client::new(), auth_config(vec![endpoint]));

    broker.acquire().await.unwrap();
    broker.invalidate().await;
    broker.acquire().await.unwrap();

    assert_eq!(hits.load(Ordering::SeqCst), 2);
}
