//! Storage tiers the current cart is remembered in.
//!
//! From most to least authoritative:
//!
//! 1. [`CartCache`] - the resolved cart itself, scoped to one visitor
//! 2. [`SessionCartStorage`] - the cart GUID in the server-side session
//! 3. [`ClientCartStorage`] - the cart GUID in a client-retained cookie
//! 4. [`CartRepository`] - the persisted cart records
//!
//! GUID tiers are written with `None` when the visitor has no cart; adapters
//! clear their slot rather than writing [`CartGuid::EMPTY`], and treat an
//! empty GUID read back from storage as absent.

pub mod cache;
pub mod cookie;
pub mod memory;
pub mod session;

use async_trait::async_trait;

use cartwright_core::CartGuid;

use crate::error::Result;
use crate::models::{Cart, Site, User};

pub use cache::{RequestCartCache, ScopedCartCache, SharedCartCache};
pub use cookie::CookieCartStorage;
pub use memory::{InMemoryCartRepository, MemoryGuidStorage};
pub use session::TowerSessionCartStorage;

/// Cart GUID kept on the client (usually a cookie).
#[async_trait]
pub trait ClientCartStorage: Send + Sync {
    /// The stored GUID, if any.
    async fn cart_guid(&self) -> Result<Option<CartGuid>>;

    /// Store `guid`, or clear the slot when `None`.
    async fn set_cart_guid(&self, guid: Option<CartGuid>) -> Result<()>;
}

/// Cart GUID kept in the server-side session.
#[async_trait]
pub trait SessionCartStorage: Send + Sync {
    /// The stored GUID, if any.
    async fn cart_guid(&self) -> Result<Option<CartGuid>>;

    /// Store `guid`, or clear the slot when `None`.
    async fn set_cart_guid(&self, guid: Option<CartGuid>) -> Result<()>;

    /// Whether the request runs with session state.
    ///
    /// A cart recovered from client storage while a session is available
    /// belongs to an earlier session and gets anonymized before reuse.
    fn session_available(&self) -> bool;
}

/// Visitor-scoped cache of the resolved cart.
#[async_trait]
pub trait CartCache: Send + Sync {
    /// The cached cart, if any.
    async fn cart(&self) -> Option<Cart>;

    /// Replace the cached cart, or evict it when `None`.
    async fn store_cart(&self, cart: Option<Cart>);
}

/// Persistent cart records.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Load a cart by GUID. The empty GUID never matches.
    async fn cart(&self, guid: CartGuid) -> Result<Option<Cart>>;

    /// The most recently updated cart `user` owns on `site`.
    ///
    /// Always `None` for the public user: anonymous carts are only reachable
    /// through their GUID.
    async fn users_cart(&self, user: &User, site: &Site) -> Result<Option<Cart>>;

    /// Insert or update a cart.
    async fn set_cart(&self, cart: &Cart) -> Result<()>;

    /// Delete every cart `user` owns on `site`.
    async fn delete_users_cart(&self, user: &User, site: &Site) -> Result<()>;
}

/// Parse a GUID read back from an untrusted store.
///
/// Unparseable values and the empty sentinel both read as absent.
pub(crate) fn parse_stored_guid(raw: &str) -> Option<CartGuid> {
    match raw.parse::<CartGuid>() {
        Ok(guid) => guid.non_empty(),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring stored cart guid");
            None
        }
    }
}
