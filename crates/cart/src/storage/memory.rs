//! In-memory storage tiers.
//!
//! Used by tests and by single-process deployments that do not persist carts.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use cartwright_core::CartGuid;

use super::{CartRepository, ClientCartStorage, SessionCartStorage};
use crate::error::Result;
use crate::models::{Cart, CartOwner, Site, User};

/// A single GUID slot usable as either client or session storage.
#[derive(Debug)]
pub struct MemoryGuidStorage {
    slot: RwLock<Option<CartGuid>>,
    session_available: bool,
}

impl MemoryGuidStorage {
    /// Create an empty slot. `session_available` is only consulted when the
    /// slot stands in for session storage.
    #[must_use]
    pub fn new(session_available: bool) -> Self {
        Self {
            slot: RwLock::new(None),
            session_available,
        }
    }

    /// Create a slot already holding `guid`.
    #[must_use]
    pub fn with_guid(guid: CartGuid, session_available: bool) -> Self {
        Self {
            slot: RwLock::new(Some(guid)),
            session_available,
        }
    }

    /// Current slot content.
    pub async fn get(&self) -> Option<CartGuid> {
        *self.slot.read().await
    }

    async fn set(&self, guid: Option<CartGuid>) {
        *self.slot.write().await = guid.and_then(CartGuid::non_empty);
    }
}

impl Default for MemoryGuidStorage {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl ClientCartStorage for MemoryGuidStorage {
    async fn cart_guid(&self) -> Result<Option<CartGuid>> {
        Ok(self.get().await)
    }

    async fn set_cart_guid(&self, guid: Option<CartGuid>) -> Result<()> {
        self.set(guid).await;
        Ok(())
    }
}

#[async_trait]
impl SessionCartStorage for MemoryGuidStorage {
    async fn cart_guid(&self) -> Result<Option<CartGuid>> {
        Ok(self.get().await)
    }

    async fn set_cart_guid(&self, guid: Option<CartGuid>) -> Result<()> {
        self.set(guid).await;
        Ok(())
    }

    fn session_available(&self) -> bool {
        self.session_available
    }
}

/// Cart repository held in a `HashMap`.
#[derive(Debug, Default)]
pub struct InMemoryCartRepository {
    carts: RwLock<HashMap<CartGuid, Cart>>,
}

impl InMemoryCartRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored carts.
    pub async fn len(&self) -> usize {
        self.carts.read().await.len()
    }

    /// Whether no carts are stored.
    pub async fn is_empty(&self) -> bool {
        self.carts.read().await.is_empty()
    }

    /// Whether a cart with `guid` is stored.
    pub async fn contains(&self, guid: CartGuid) -> bool {
        self.carts.read().await.contains_key(&guid)
    }
}

fn owned_by_on(cart: &Cart, user: &User, site: &Site) -> bool {
    cart.site_id == site.id && cart.owner == CartOwner::Registered(user.id)
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn cart(&self, guid: CartGuid) -> Result<Option<Cart>> {
        if guid.is_empty() {
            return Ok(None);
        }
        Ok(self.carts.read().await.get(&guid).cloned())
    }

    async fn users_cart(&self, user: &User, site: &Site) -> Result<Option<Cart>> {
        if !user.is_authenticated() {
            return Ok(None);
        }
        let carts = self.carts.read().await;
        Ok(carts
            .values()
            .filter(|cart| owned_by_on(cart, user, site))
            .max_by_key(|cart| cart.last_update)
            .cloned())
    }

    async fn set_cart(&self, cart: &Cart) -> Result<()> {
        self.carts.write().await.insert(cart.guid, cart.clone());
        Ok(())
    }

    async fn delete_users_cart(&self, user: &User, site: &Site) -> Result<()> {
        if !user.is_authenticated() {
            return Ok(());
        }
        self.carts
            .write()
            .await
            .retain(|_, cart| !owned_by_on(cart, user, site));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use cartwright_core::{CurrencyCode, SiteId, UserId};

    use super::*;

    fn site(id: i32) -> Site {
        Site::new(SiteId::new(id), format!("site-{id}"), CurrencyCode::USD)
    }

    fn owned_cart(user: &User, site: &Site) -> Cart {
        let mut cart = Cart::new(CartGuid::new_v4(), site.id, CurrencyCode::USD);
        cart.owner = CartOwner::of(user);
        cart
    }

    #[tokio::test]
    async fn test_guid_slot_clears_on_empty() {
        let slot = MemoryGuidStorage::with_guid(CartGuid::new_v4(), true);
        ClientCartStorage::set_cart_guid(&slot, Some(CartGuid::EMPTY))
            .await
            .unwrap();
        assert_eq!(slot.get().await, None);
    }

    #[tokio::test]
    async fn test_session_availability_flag() {
        assert!(MemoryGuidStorage::new(true).session_available());
        assert!(!MemoryGuidStorage::new(false).session_available());
    }

    #[tokio::test]
    async fn test_cart_lookup_by_guid() {
        let repo = InMemoryCartRepository::new();
        let cart = Cart::new(CartGuid::new_v4(), SiteId::new(1), CurrencyCode::USD);
        repo.set_cart(&cart).await.unwrap();

        assert_eq!(repo.cart(cart.guid).await.unwrap(), Some(cart));
        assert_eq!(repo.cart(CartGuid::new_v4()).await.unwrap(), None);
        assert_eq!(repo.cart(CartGuid::EMPTY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_users_cart_picks_latest_on_site() {
        let repo = InMemoryCartRepository::new();
        let alice = User::registered(UserId::new(2), "alice");
        let (one, two) = (site(1), site(2));

        let mut older = owned_cart(&alice, &one);
        older.last_update -= Duration::hours(1);
        let newer = owned_cart(&alice, &one);
        let elsewhere = owned_cart(&alice, &two);
        for cart in [&older, &newer, &elsewhere] {
            repo.set_cart(cart).await.unwrap();
        }

        let found = repo.users_cart(&alice, &one).await.unwrap();
        assert_eq!(found.map(|c| c.guid), Some(newer.guid));
    }

    #[tokio::test]
    async fn test_users_cart_is_none_for_public_user() {
        let repo = InMemoryCartRepository::new();
        let public = User::public(UserId::new(1));
        let one = site(1);
        repo.set_cart(&owned_cart(&public, &one)).await.unwrap();

        assert_eq!(repo.users_cart(&public, &one).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_users_cart_only_touches_that_site() {
        let repo = InMemoryCartRepository::new();
        let alice = User::registered(UserId::new(2), "alice");
        let (one, two) = (site(1), site(2));
        let here = owned_cart(&alice, &one);
        let there = owned_cart(&alice, &two);
        repo.set_cart(&here).await.unwrap();
        repo.set_cart(&there).await.unwrap();

        repo.delete_users_cart(&alice, &one).await.unwrap();

        assert!(!repo.contains(here.guid).await);
        assert!(repo.contains(there.guid).await);
        assert_eq!(repo.len().await, 1);
    }
}
