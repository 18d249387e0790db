//! Cartwright Cart library.
//!
//! Resolves "the current shopping cart" for a visitor on a site. A cart can be
//! remembered in four places (a per-visitor cache, the server-side session, a
//! client cookie and the cart database); [`CurrentCartService`] consults them in
//! order of authority, validates the candidate against the site and user, hands
//! ownership over when a visitor logs in, and writes the result back so the
//! next request is cheap.
//!
//! # Modules
//!
//! - [`service`] - The resolution algorithm
//! - [`strategy`] - Ownership, takeover, anonymization and currency rules
//! - [`storage`] - Storage tier traits and their cookie/session/cache/memory adapters
//! - [`db`] - `PostgreSQL` cart repository
//! - [`directory`] - Customer and currency lookups the strategy depends on
//! - [`factory`] - New cart construction
//! - [`evaluation`] - Totals recalculation
//! - [`config`] - Environment-based configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod directory;
pub mod error;
pub mod evaluation;
pub mod factory;
pub mod models;
pub mod service;
pub mod storage;
pub mod strategy;

pub use config::{CacheConfig, CartConfig, ConfigError, CookieConfig};
pub use db::{PgCartRepository, RepositoryError};
pub use directory::{
    CurrencyCatalog, CustomerDirectory, InMemoryCustomerDirectory, StaticCurrencyCatalog,
};
pub use error::{CartError, Result};
pub use evaluation::{CartEvaluator, TotalsEvaluator};
pub use factory::{CartFactory, DefaultCartFactory};
pub use models::{Address, Cart, CartItem, CartOwner, CartTotals, Customer, Site, User};
pub use service::{CartStores, CurrentCartService};
pub use storage::{
    CartCache, CartRepository, ClientCartStorage, CookieCartStorage, InMemoryCartRepository,
    MemoryGuidStorage, RequestCartCache, ScopedCartCache, SessionCartStorage, SharedCartCache,
    TowerSessionCartStorage,
};
pub use strategy::{CurrentCartStrategy, DefaultCurrentCartStrategy, StoredCartPreference};
