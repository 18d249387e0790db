//! Current cart resolution.
//!
//! [`CurrentCartService`] answers "which cart is this visitor using right
//! now" by walking the storage tiers in priority order, applying the
//! [`CurrentCartStrategy`] rules, and writing the answer back to every tier.
//!
//! Resolution order:
//!
//! 1. Cache hit: the candidate is used as-is (no re-evaluation).
//! 2. Cache miss: session GUID, then client GUID, each looked up in the
//!    repository. A cart recovered through client storage while a session is
//!    available is anonymized before reuse.
//! 3. A candidate from another site is dropped in favour of the user's stored
//!    cart on this site.
//! 4. A candidate owned by someone else is either dropped or taken over.
//!    Authenticated users may get their stored cart instead, or have it
//!    deleted when the candidate supersedes it.
//! 5. Pending anonymization is applied and persisted.
//! 6. With no candidate left, a new cart is created.
//! 7. Otherwise the cart is refreshed and, when flagged, re-evaluated.
//! 8. The result is remembered in cache, session and client storage.
//!
//! A service instance serves a single request: the [`CartStores`] it is built
//! with are scoped to one visitor.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use cartwright_core::CartGuid;

use crate::error::Result;
use crate::evaluation::CartEvaluator;
use crate::factory::CartFactory;
use crate::models::{Cart, Site, User};
use crate::storage::{CartCache, CartRepository, ClientCartStorage, SessionCartStorage};
use crate::strategy::CurrentCartStrategy;

/// The visitor-scoped storage tiers.
#[derive(Clone)]
pub struct CartStores {
    /// Cookie (or equivalent) holding the cart GUID.
    pub client: Arc<dyn ClientCartStorage>,
    /// Server session holding the cart GUID.
    pub session: Arc<dyn SessionCartStorage>,
    /// Resolved cart cache.
    pub cache: Arc<dyn CartCache>,
}

/// Where a stored candidate was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CandidateSource {
    Session,
    Client,
}

/// Resolves and remembers the visitor's current cart.
#[derive(Clone)]
pub struct CurrentCartService {
    stores: CartStores,
    repository: Arc<dyn CartRepository>,
    factory: Arc<dyn CartFactory>,
    strategy: Arc<dyn CurrentCartStrategy>,
    evaluator: Arc<dyn CartEvaluator>,
}

impl CurrentCartService {
    /// Create a resolver for one visitor.
    #[must_use]
    pub fn new(
        stores: CartStores,
        repository: Arc<dyn CartRepository>,
        factory: Arc<dyn CartFactory>,
        strategy: Arc<dyn CurrentCartStrategy>,
        evaluator: Arc<dyn CartEvaluator>,
    ) -> Self {
        Self {
            stores,
            repository,
            factory,
            strategy,
            evaluator,
        }
    }

    /// The cart `user` should use on `site`.
    ///
    /// Never fails to produce a cart: when nothing usable is stored, a new one
    /// is created.
    ///
    /// # Errors
    ///
    /// Returns `CartError` only when a collaborator fails.
    #[instrument(skip(self, user, site), fields(user_id = %user.id, site_id = %site.id))]
    pub async fn current_cart(&self, user: &User, site: &Site) -> Result<Cart> {
        let mut evaluate = false;
        let mut anonymize = false;

        let mut cart = match self.stores.cache.cart().await {
            Some(cached) => {
                debug!(cart_guid = %cached.guid, "Cart cache hit");
                Some(cached)
            }
            None => {
                evaluate = true;
                match self.stored_candidate().await? {
                    Some((stored, source)) => {
                        if source == CandidateSource::Client
                            && self.stores.session.session_available()
                        {
                            debug!(cart_guid = %stored.guid, "Cart recovered from client storage");
                            anonymize = true;
                        }
                        Some(stored)
                    }
                    None => None,
                }
            }
        };

        if let Some(candidate) = &cart
            && !self.strategy.cart_can_be_used_on_site(candidate, site)
        {
            debug!(
                cart_guid = %candidate.guid,
                cart_site_id = %candidate.site_id,
                "Cart belongs to another site"
            );
            cart = self.repository.users_cart(user, site).await?;
            anonymize = false;
            evaluate = true;
        }

        if let Some(candidate) = &cart
            && !candidate.is_owned_by(user)
        {
            if self.strategy.user_can_take_over_cart(candidate, user) {
                if user.is_authenticated() {
                    if self.strategy.prefer_stored_cart(cart.as_ref(), user) {
                        debug!("Preferring the user's stored cart");
                        match self.repository.users_cart(user, site).await? {
                            Some(stored) => {
                                cart = Some(stored);
                                anonymize = false;
                            }
                            // Nothing stored: keep a non-empty candidate rather than lose its items
                            None if cart.as_ref().is_some_and(|c| !c.is_empty()) => {
                                anonymize = true;
                            }
                            None => {
                                cart = None;
                                anonymize = false;
                            }
                        }
                    } else {
                        self.repository.delete_users_cart(user, site).await?;
                        info!(user_id = %user.id, "Deleted superseded stored cart");
                        anonymize = true;
                    }
                }

                if let Some(taken) = cart.as_mut() {
                    if anonymize {
                        self.anonymize(taken).await?;
                        anonymize = false;
                    }
                    self.take_over(taken, user).await?;
                }
                evaluate = true;
            } else {
                debug!(cart_guid = %candidate.guid, "Cart is owned by another user");
                cart = None;
                anonymize = false;
            }
        }

        if anonymize && let Some(pending) = cart.as_mut() {
            self.anonymize(pending).await?;
            evaluate = true;
        }

        let cart = match cart {
            None => self.create_cart(user, site).await?,
            Some(mut cart) => {
                self.strategy.refresh_cart(&mut cart, site).await?;
                if evaluate {
                    // Evaluation may ask for the current cart; serve it from the cache.
                    self.stores.cache.store_cart(Some(cart.clone())).await;
                    self.evaluator.evaluate(&mut cart).await?;
                }
                cart
            }
        };

        self.remember(Some(&cart)).await?;
        Ok(cart)
    }

    /// Make `cart` the visitor's current cart, or forget it with `None`.
    ///
    /// The cache entry is overwritten, so the next [`current_cart`] call sees
    /// the new value without touching the repository.
    ///
    /// # Errors
    ///
    /// Returns `CartError` when session or client storage fails.
    ///
    /// [`current_cart`]: Self::current_cart
    #[instrument(skip(self, cart), fields(cart_guid = ?cart.as_ref().map(|c| c.guid)))]
    pub async fn set_current_cart(&self, cart: Option<Cart>) -> Result<()> {
        self.remember(cart.as_ref()).await
    }

    /// Look the candidate up through session storage, then client storage.
    async fn stored_candidate(&self) -> Result<Option<(Cart, CandidateSource)>> {
        if let Some(guid) = self.stores.session.cart_guid().await?
            && let Some(cart) = self.repository.cart(guid).await?
        {
            return Ok(Some((cart, CandidateSource::Session)));
        }

        if let Some(guid) = self.stores.client.cart_guid().await?
            && let Some(cart) = self.repository.cart(guid).await?
        {
            return Ok(Some((cart, CandidateSource::Client)));
        }

        Ok(None)
    }

    async fn anonymize(&self, cart: &mut Cart) -> Result<()> {
        self.strategy.anonymize_cart(Some(cart));
        cart.touch();
        self.repository.set_cart(cart).await?;
        info!(cart_guid = %cart.guid, "Anonymized cart");
        Ok(())
    }

    /// Take `cart` over for `user`, persisting it when the owner changed.
    async fn take_over(&self, cart: &mut Cart, user: &User) -> Result<()> {
        let previous_owner = cart.owner;
        self.strategy.take_over_cart(cart, user).await?;
        if cart.owner != previous_owner {
            self.repository.set_cart(cart).await?;
            info!(cart_guid = %cart.guid, user_id = %user.id, "Cart ownership changed");
        }
        Ok(())
    }

    async fn create_cart(&self, user: &User, site: &Site) -> Result<Cart> {
        let mut cart = self.factory.create_cart(site, user);
        self.take_over(&mut cart, user).await?;
        info!(cart_guid = %cart.guid, "Started new cart");
        Ok(cart)
    }

    async fn remember(&self, cart: Option<&Cart>) -> Result<()> {
        let guid: Option<CartGuid> = cart.map(|c| c.guid);
        self.stores.cache.store_cart(cart.cloned()).await;
        self.stores.session.set_cart_guid(guid).await?;
        self.stores.client.set_cart_guid(guid).await?;
        Ok(())
    }
}
