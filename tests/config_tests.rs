//! Configuration resolution with environment overlays.

mod support;

use std::path::PathBuf;

use bloomwatch::config::AppConfig;

#[test]
fn test_env_overrides_credentials() {
    support::with_scoped_env(
        &[
            ("BLOOM_CLIENT_ID", Some("env-client")),
            ("BLOOM_CLIENT_SECRET", Some("env-secret")),
            ("BLOOM_TOKEN_ENDPOINTS", None),
            ("BLOOM_INSTANCE_ID", None),
            ("BLOOM_STORE_PATH", None),
        ],
        || {
            let config = AppConfig::load().unwrap();
            assert_eq!(config.auth.client_id, "env-client");
            assert_eq!(config.auth.client_secret, "env-secret");
            // Defaults survive next to the overlay
            assert_eq!(config.auth.token_endpoints.len(), 2);
        },
    );
}

#[test]
fn test_env_token_endpoint_list_is_split_and_trimmed() {
    support::with_scoped_env(
        &[
            ("BLOOM_CLIENT_ID", None),
            ("BLOOM_CLIENT_SECRET", None),
            (
                "BLOOM_TOKEN_ENDPOINTS",
                Some("https://a.example/token, https://b.example/token"),
            ),
            ("BLOOM_INSTANCE_ID", None),
            ("BLOOM_STORE_PATH", None),
        ],
        || {
            let config = AppConfig::load().unwrap();
            assert_eq!(
                config.auth.token_endpoints,
                vec![
                    "https://a.example/token".to_string(),
                    "https://b.example/token".to_string(),
                ]
            );
        },
    );
}

#[test]
fn test_env_enables_overlay_and_file_store() {
    support::with_scoped_env(
        &[
            ("BLOOM_CLIENT_ID", None),
            ("BLOOM_CLIENT_SECRET", None),
            ("BLOOM_TOKEN_ENDPOINTS", None),
            ("BLOOM_INSTANCE_ID", Some("inst-1")),
            ("BLOOM_STORE_PATH", Some("data/history.json")),
        ],
        || {
            let config = AppConfig::load().unwrap();
            assert_eq!(config.overlay.instance_id.as_deref(), Some("inst-1"));
            assert_eq!(config.store.path, Some(PathBuf::from("data/history.json")));
        },
    );
}

#[test]
fn test_blank_env_values_are_ignored() {
    support::with_scoped_env(
        &[
            ("BLOOM_CLIENT_ID", Some("")),
            ("BLOOM_CLIENT_SECRET", Some("")),
            ("BLOOM_TOKEN_ENDPOINTS", Some("  ,  ")),
            ("BLOOM_INSTANCE_ID", Some("")),
            ("BLOOM_STORE_PATH", Some("")),
        ],
        || {
            // Credentials seeded as a file would, so a blank overlay is visible
            let mut config = AppConfig::default();
            config.auth.client_id = "configured-client".to_string();
            config.auth.client_secret = "configured-secret".to_string();
            config.apply_env();

            assert_eq!(config.auth.client_id, "configured-client");
            assert_eq!(config.auth.client_secret, "configured-secret");
            assert!(config.overlay.instance_id.is_none());
            assert!(config.store.path.is_none());
            // A blank list keeps the built-in endpoints
            assert_eq!(config.auth.token_endpoints.len(), 2);
        },
    );
}
