//! Global store initialization.
//!
//! The global handle lives in a process-wide OnceLock, so this binary
//! holds a single test walking the whole lifecycle in order.
#![cfg(feature = "memory-store")]

use bloomwatch::config::StoreConfig;
use bloomwatch::store;

#[tokio::test]
async fn test_global_store_lifecycle() {
    // Before initialization the accessor refuses.
    assert!(store::get_store().is_err());

    let config = StoreConfig { path: None };
    store::init_store(&config).await.unwrap();
    let first = store::get_store().unwrap();

    // A second init is a no-op, not an error.
    store::init_store(&config).await.unwrap();
    let second = store::get_store().unwrap();
    assert!(std::sync::Arc::ptr_eq(first, second));

    // The handle is live.
    assert!(first.health_check().await.unwrap());
}
