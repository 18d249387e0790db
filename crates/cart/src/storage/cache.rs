//! Cart caches.
//!
//! [`SharedCartCache`] is a process-wide `moka` cache keyed by visitor; each
//! request resolves through a [`ScopedCartCache`] bound to its visitor key.
//! [`RequestCartCache`] only lives as long as one request.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tokio::sync::Mutex;

use super::CartCache;
use crate::config::CacheConfig;
use crate::models::Cart;

/// Process-wide cart cache keyed by visitor (session ID or similar).
#[derive(Clone)]
pub struct SharedCartCache {
    cache: Cache<String, Cart>,
}

impl SharedCartCache {
    /// Create a cache with capacity and time-to-idle from configuration.
    #[must_use]
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_idle(Duration::from_secs(config.ttl_seconds))
            .build();
        Self { cache }
    }

    /// Cache view for a single visitor.
    #[must_use]
    pub fn scoped(&self, visitor_key: impl Into<String>) -> ScopedCartCache {
        ScopedCartCache {
            cache: self.cache.clone(),
            key: visitor_key.into(),
        }
    }

    /// Drop every visitor's cached cart.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

/// A [`SharedCartCache`] bound to one visitor.
#[derive(Clone)]
pub struct ScopedCartCache {
    cache: Cache<String, Cart>,
    key: String,
}

impl ScopedCartCache {
    /// The visitor key this view reads and writes.
    #[must_use]
    pub fn visitor_key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl CartCache for ScopedCartCache {
    async fn cart(&self) -> Option<Cart> {
        self.cache.get(&self.key).await
    }

    async fn store_cart(&self, cart: Option<Cart>) {
        match cart {
            Some(cart) => self.cache.insert(self.key.clone(), cart).await,
            None => self.cache.invalidate(&self.key).await,
        }
    }
}

/// Single-slot cache that lives for one request.
#[derive(Debug, Default)]
pub struct RequestCartCache {
    slot: Mutex<Option<Cart>>,
}

impl RequestCartCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartCache for RequestCartCache {
    async fn cart(&self) -> Option<Cart> {
        self.slot.lock().await.clone()
    }

    async fn store_cart(&self, cart: Option<Cart>) {
        *self.slot.lock().await = cart;
    }
}
