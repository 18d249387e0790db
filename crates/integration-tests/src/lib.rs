//! Integration tests for Cartwright.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory resolution tests
//! cargo test -p cartwright-integration-tests
//!
//! # Include the PostgreSQL repository tests
//! CART_DATABASE_URL=postgres://localhost/cartwright_test \
//!     cargo test -p cartwright-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `current_cart` - Resolution across cache, session, client storage and repository
//! - `cart_storage` - Cookie and `tower-sessions` adapters driving the resolver
//! - `pg_repository` - `PostgreSQL` repository (requires a database)
//!
//! The fixtures here model a shop (shared repository, cache and directories)
//! and its visitors (per-browser session and cookie slots), so tests can replay
//! several requests from the same visitor.

use std::sync::Arc;

use rust_decimal::Decimal;

use cartwright_cart::{
    CacheConfig, Cart, CartItem, CartStores, CurrentCartService, DefaultCartFactory,
    DefaultCurrentCartStrategy, InMemoryCartRepository, InMemoryCustomerDirectory,
    MemoryGuidStorage, SharedCartCache, Site, StaticCurrencyCatalog, StoredCartPreference,
    TotalsEvaluator,
};
use cartwright_core::{CartGuid, CurrencyCode, SiteId, SkuId};

/// The main test site, priced in USD with EUR also enabled.
#[must_use]
pub fn home_site() -> Site {
    Site::new(SiteId::new(1), "home", CurrencyCode::USD)
}

/// A second site, priced in EUR only.
#[must_use]
pub fn euro_site() -> Site {
    Site::new(SiteId::new(2), "euro", CurrencyCode::EUR)
}

/// Currency configuration for [`home_site`] and [`euro_site`].
#[must_use]
pub fn currencies() -> StaticCurrencyCatalog {
    StaticCurrencyCatalog::new()
        .with_site(SiteId::new(1), CurrencyCode::USD, [CurrencyCode::EUR])
        .with_site(SiteId::new(2), CurrencyCode::EUR, [])
}

/// A cart on `site` holding `items` distinct one-dollar SKUs.
#[must_use]
pub fn cart_with_items(site: &Site, items: u32) -> Cart {
    let mut cart = Cart::new(CartGuid::new_v4(), site.id, site.main_currency);
    for sku in (1..=items).map(|n| i32::try_from(n).unwrap_or(i32::MAX)) {
        cart.add_item(CartItem::new(SkuId::new(sku), format!("Item {sku}"), 1, Decimal::ONE));
    }
    cart
}

/// Shared, process-wide state: what survives between requests.
pub struct Shop {
    pub repository: Arc<InMemoryCartRepository>,
    pub cache: SharedCartCache,
    pub customers: InMemoryCustomerDirectory,
    pub currencies: StaticCurrencyCatalog,
    pub preference: StoredCartPreference,
}

impl Default for Shop {
    fn default() -> Self {
        Self::new()
    }
}

impl Shop {
    /// A shop with an empty repository and the default currency setup.
    #[must_use]
    pub fn new() -> Self {
        Self {
            repository: Arc::new(InMemoryCartRepository::new()),
            cache: SharedCartCache::new(&CacheConfig::default()),
            customers: InMemoryCustomerDirectory::new(),
            currencies: currencies(),
            preference: StoredCartPreference::default(),
        }
    }

    /// Replace the customer directory.
    #[must_use]
    pub fn with_customers(mut self, customers: InMemoryCustomerDirectory) -> Self {
        self.customers = customers;
        self
    }

    /// Replace the currency catalog.
    #[must_use]
    pub fn with_currencies(mut self, currencies: StaticCurrencyCatalog) -> Self {
        self.currencies = currencies;
        self
    }

    /// Change when a logged-in user's stored cart wins over the candidate.
    #[must_use]
    pub const fn with_preference(mut self, preference: StoredCartPreference) -> Self {
        self.preference = preference;
        self
    }

    /// Build the resolver for one request from `visitor`.
    #[must_use]
    pub fn request(&self, visitor: &Visitor) -> CurrentCartService {
        let strategy = DefaultCurrentCartStrategy::new(
            Arc::new(self.customers.clone()),
            Arc::new(self.currencies.clone()),
        )
        .with_stored_cart_preference(self.preference);

        CurrentCartService::new(
            CartStores {
                client: visitor.cookie.clone(),
                session: visitor.session.clone(),
                cache: Arc::new(self.cache.scoped(visitor.key.clone())),
            },
            self.repository.clone(),
            Arc::new(DefaultCartFactory),
            Arc::new(strategy),
            Arc::new(TotalsEvaluator),
        )
    }
}

/// One browser: its own cookie and session slots plus a cache key.
pub struct Visitor {
    pub key: String,
    pub cookie: Arc<MemoryGuidStorage>,
    pub session: Arc<MemoryGuidStorage>,
}

impl Visitor {
    /// A first-time visitor with an active session.
    #[must_use]
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            cookie: Arc::new(MemoryGuidStorage::new(true)),
            session: Arc::new(MemoryGuidStorage::new(true)),
        }
    }

    /// The same browser returning after its session and cache entry expired:
    /// only the cookie is left.
    #[must_use]
    pub fn returning(&self, key: &str) -> Self {
        Self {
            key: key.to_string(),
            cookie: self.cookie.clone(),
            session: Arc::new(MemoryGuidStorage::new(true)),
        }
    }
}
