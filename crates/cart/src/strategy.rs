//! Business rules for picking and handing over carts.
//!
//! The resolver in [`crate::service`] asks the strategy every policy question
//! and lets it perform every mutation tied to ownership, so deployments can
//! swap the rules without touching the resolution order.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::directory::{CurrencyCatalog, CustomerDirectory};
use crate::error::Result;
use crate::models::{Cart, CartOwner, Site, User};

/// Policy decisions and ownership mutations used while resolving a cart.
#[async_trait]
pub trait CurrentCartStrategy: Send + Sync {
    /// Whether `cart` may be used on `site`.
    fn cart_can_be_used_on_site(&self, cart: &Cart, site: &Site) -> bool;

    /// Whether `user` may claim `cart` from its current owner.
    fn user_can_take_over_cart(&self, cart: &Cart, user: &User) -> bool;

    /// Hand `cart` over to `user`.
    async fn take_over_cart(&self, cart: &mut Cart, user: &User) -> Result<()>;

    /// Whether `user`'s stored cart should replace the candidate `cart`.
    fn prefer_stored_cart(&self, cart: Option<&Cart>, user: &User) -> bool;

    /// Strip personal data before the cart is reused by another visitor.
    fn anonymize_cart(&self, cart: Option<&mut Cart>);

    /// Bring state that may have gone stale since the cart was stored up to date.
    ///
    /// `site` is the site the cart is being resolved for; its main currency
    /// is the fallback when the catalog has none on record.
    async fn refresh_cart(&self, cart: &mut Cart, site: &Site) -> Result<()>;
}

/// When an authenticated user's stored cart wins over the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoredCartPreference {
    /// Only an absent or empty candidate is abandoned.
    #[default]
    WhenCandidateEmpty,
    /// The stored cart always wins when one exists; the candidate is dropped
    /// even if it holds items.
    Always,
}

/// The standard cart rules.
#[derive(Clone)]
pub struct DefaultCurrentCartStrategy {
    customers: Arc<dyn CustomerDirectory>,
    currencies: Arc<dyn CurrencyCatalog>,
    stored_cart_preference: StoredCartPreference,
}

impl DefaultCurrentCartStrategy {
    /// Create the strategy over the given lookups.
    #[must_use]
    pub fn new(customers: Arc<dyn CustomerDirectory>, currencies: Arc<dyn CurrencyCatalog>) -> Self {
        Self {
            customers,
            currencies,
            stored_cart_preference: StoredCartPreference::default(),
        }
    }

    /// Override when a stored cart replaces the candidate.
    #[must_use]
    pub const fn with_stored_cart_preference(mut self, preference: StoredCartPreference) -> Self {
        self.stored_cart_preference = preference;
        self
    }
}

#[async_trait]
impl CurrentCartStrategy for DefaultCurrentCartStrategy {
    fn cart_can_be_used_on_site(&self, cart: &Cart, site: &Site) -> bool {
        cart.site_id == site.id
    }

    fn user_can_take_over_cart(&self, cart: &Cart, _user: &User) -> bool {
        !cart.owner.is_registered()
    }

    async fn take_over_cart(&self, cart: &mut Cart, user: &User) -> Result<()> {
        if !user.is_authenticated() {
            return Ok(());
        }

        cart.owner = CartOwner::of(user);
        cart.contact_id = self.customers.contact_for_user(user).await?;

        let customer = self.customers.customer_for_user(user, cart.site_id).await?;
        if let Some(customer) = &customer {
            cart.customer_id = Some(customer.id);
        }

        if cart.is_empty()
            && let Some(currency) = customer.and_then(|c| c.preferred_currency)
        {
            if self.currencies.is_enabled(cart.site_id, currency).await? {
                cart.currency = currency;
            } else {
                debug!(%currency, "Preferred currency is disabled on the cart's site");
            }
        }

        cart.touch();
        debug!(cart_guid = %cart.guid, user_id = %user.id, "Cart taken over");
        Ok(())
    }

    fn prefer_stored_cart(&self, cart: Option<&Cart>, _user: &User) -> bool {
        match self.stored_cart_preference {
            StoredCartPreference::Always => true,
            StoredCartPreference::WhenCandidateEmpty => cart.is_none_or(Cart::is_empty),
        }
    }

    fn anonymize_cart(&self, cart: Option<&mut Cart>) {
        let Some(cart) = cart else {
            return;
        };

        cart.customer_id = None;
        cart.shipping_option_id = None;
        cart.payment_option_id = None;
        cart.payment_gateway_data.clear();
        cart.billing_address = None;
        cart.shipping_address = None;
        cart.company_address = None;
        cart.note = None;
        cart.private_data_cleared = true;
    }

    async fn refresh_cart(&self, cart: &mut Cart, site: &Site) -> Result<()> {
        if self.currencies.is_enabled(cart.site_id, cart.currency).await? {
            return Ok(());
        }

        let main = match self.currencies.main_currency(cart.site_id).await? {
            Some(main) => main,
            None => {
                warn!(
                    cart_guid = %cart.guid,
                    site_id = %cart.site_id,
                    "Currency catalog has no main currency for site, using the site's own"
                );
                site.main_currency
            }
        };

        debug!(
            cart_guid = %cart.guid,
            from = %cart.currency,
            to = %main,
            "Replacing disabled cart currency"
        );
        cart.currency = main;
        cart.touch();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use cartwright_core::{
        AddressId, CartGuid, ContactId, CurrencyCode, CustomerId, PaymentOptionId,
        ShippingOptionId, SiteId, SkuId, UserId,
    };

    use super::*;
    use crate::directory::{InMemoryCustomerDirectory, StaticCurrencyCatalog};
    use crate::models::{Address, CartItem, Customer};

    const SITE: SiteId = SiteId::new(1);

    fn alice() -> User {
        User::registered(UserId::new(2), "alice")
    }

    fn strategy() -> DefaultCurrentCartStrategy {
        let customers = InMemoryCustomerDirectory::new()
            .with_customer(
                SITE,
                Customer {
                    id: CustomerId::new(10),
                    user_id: Some(UserId::new(2)),
                    preferred_currency: Some(CurrencyCode::EUR),
                },
            )
            .with_contact(UserId::new(2), ContactId::new(77));
        let currencies = StaticCurrencyCatalog::new()
            .with_site(SITE, CurrencyCode::USD, [CurrencyCode::EUR])
            .with_site(SiteId::new(2), CurrencyCode::GBP, []);
        DefaultCurrentCartStrategy::new(Arc::new(customers), Arc::new(currencies))
    }

    fn home() -> Site {
        Site::new(SITE, "home", CurrencyCode::USD)
    }

    fn cart() -> Cart {
        Cart::new(CartGuid::new_v4(), SITE, CurrencyCode::USD)
    }

    fn beans() -> CartItem {
        CartItem::new(SkuId::new(1), "Beans", 2, Decimal::new(450, 2))
    }

    fn address(name: &str) -> Address {
        Address {
            id: Some(AddressId::new(1)),
            name: name.to_string(),
            line1: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            zip: "12345".to_string(),
            country_code: "US".to_string(),
            ..Address::default()
        }
    }

    #[test]
    fn test_cart_can_be_used_on_its_own_site_only() {
        let strategy = strategy();
        let cart = cart();
        let home = home();
        let other = Site::new(SiteId::new(2), "other", CurrencyCode::GBP);

        assert!(strategy.cart_can_be_used_on_site(&cart, &home));
        assert!(!strategy.cart_can_be_used_on_site(&cart, &other));
    }

    #[test]
    fn test_only_unowned_or_public_carts_can_be_taken_over() {
        let strategy = strategy();
        let mut cart = cart();

        assert!(strategy.user_can_take_over_cart(&cart, &alice()));

        cart.owner = CartOwner::Public(UserId::new(1));
        assert!(strategy.user_can_take_over_cart(&cart, &alice()));

        cart.owner = CartOwner::Registered(UserId::new(3));
        assert!(!strategy.user_can_take_over_cart(&cart, &alice()));
    }

    #[tokio::test]
    async fn test_take_over_binds_user_contact_customer_and_currency() {
        let strategy = strategy();
        let mut cart = cart();

        strategy.take_over_cart(&mut cart, &alice()).await.unwrap();

        assert_eq!(cart.owner, CartOwner::Registered(UserId::new(2)));
        assert_eq!(cart.contact_id, Some(ContactId::new(77)));
        assert_eq!(cart.customer_id, Some(CustomerId::new(10)));
        assert_eq!(cart.currency, CurrencyCode::EUR);
    }

    #[tokio::test]
    async fn test_take_over_keeps_currency_of_non_empty_cart() {
        let strategy = strategy();
        let mut cart = cart();
        cart.add_item(beans());

        strategy.take_over_cart(&mut cart, &alice()).await.unwrap();

        assert_eq!(cart.currency, CurrencyCode::USD);
        assert_eq!(cart.customer_id, Some(CustomerId::new(10)));
    }

    #[tokio::test]
    async fn test_take_over_without_customer_record() {
        let strategy = strategy();
        let bob = User::registered(UserId::new(3), "bob");
        let mut cart = cart();

        strategy.take_over_cart(&mut cart, &bob).await.unwrap();

        assert_eq!(cart.owner, CartOwner::Registered(bob.id));
        assert_eq!(cart.contact_id, None);
        assert_eq!(cart.customer_id, None);
        assert_eq!(cart.currency, CurrencyCode::USD);
    }

    #[tokio::test]
    async fn test_take_over_by_public_user_is_noop() {
        let strategy = strategy();
        let mut cart = cart();
        let before = cart.clone();

        strategy
            .take_over_cart(&mut cart, &User::public(UserId::new(1)))
            .await
            .unwrap();

        assert_eq!(cart, before);
    }

    #[test]
    fn test_prefer_stored_cart_when_candidate_empty() {
        let strategy = strategy();
        let mut cart = cart();

        assert!(strategy.prefer_stored_cart(None, &alice()));
        assert!(strategy.prefer_stored_cart(Some(&cart), &alice()));

        cart.add_item(beans());
        assert!(!strategy.prefer_stored_cart(Some(&cart), &alice()));
    }

    #[test]
    fn test_prefer_stored_cart_always() {
        let strategy = strategy().with_stored_cart_preference(StoredCartPreference::Always);
        let mut cart = cart();
        cart.add_item(beans());
        assert!(strategy.prefer_stored_cart(Some(&cart), &alice()));
    }

    #[test]
    fn test_anonymize_clears_exactly_private_fields() {
        let strategy = strategy();
        let mut cart = cart();
        cart.add_item(beans());
        cart.owner = CartOwner::Public(UserId::new(1));
        cart.contact_id = Some(ContactId::new(5));
        cart.customer_id = Some(CustomerId::new(10));
        cart.shipping_option_id = Some(ShippingOptionId::new(3));
        cart.payment_option_id = Some(PaymentOptionId::new(4));
        cart.payment_gateway_data
            .insert("token".to_string(), serde_json::json!("tok_123"));
        cart.billing_address = Some(address("Billing"));
        cart.shipping_address = Some(address("Shipping"));
        cart.company_address = Some(address("Company"));
        cart.note = Some("Leave at the door".to_string());

        let mut expected = cart.clone();
        expected.customer_id = None;
        expected.shipping_option_id = None;
        expected.payment_option_id = None;
        expected.payment_gateway_data.clear();
        expected.billing_address = None;
        expected.shipping_address = None;
        expected.company_address = None;
        expected.note = None;
        expected.private_data_cleared = true;

        strategy.anonymize_cart(Some(&mut cart));

        assert_eq!(cart, expected);
    }

    #[test]
    fn test_anonymize_none_is_noop() {
        strategy().anonymize_cart(None);
    }

    #[tokio::test]
    async fn test_refresh_replaces_disabled_currency() {
        let strategy = strategy();
        let mut cart = cart();
        cart.currency = CurrencyCode::GBP;

        strategy.refresh_cart(&mut cart, &home()).await.unwrap();

        assert_eq!(cart.currency, CurrencyCode::USD);
    }

    #[tokio::test]
    async fn test_refresh_keeps_enabled_currency() {
        let strategy = strategy();
        let mut cart = cart();
        cart.currency = CurrencyCode::EUR;
        let before = cart.clone();

        strategy.refresh_cart(&mut cart, &home()).await.unwrap();

        assert_eq!(cart, before);
    }

    #[tokio::test]
    async fn test_refresh_on_site_unknown_to_catalog_uses_site_main_currency() {
        let strategy = strategy();
        let site = Site::new(SiteId::new(42), "popup", CurrencyCode::CZK);
        let mut cart = Cart::new(CartGuid::new_v4(), site.id, CurrencyCode::AUD);

        strategy.refresh_cart(&mut cart, &site).await.unwrap();

        assert_eq!(cart.currency, CurrencyCode::CZK);
    }

    #[tokio::test]
    async fn test_take_over_ignores_disabled_preferred_currency() {
        let customers = InMemoryCustomerDirectory::new().with_customer(
            SITE,
            Customer {
                id: CustomerId::new(10),
                user_id: Some(UserId::new(2)),
                preferred_currency: Some(CurrencyCode::GBP),
            },
        );
        let currencies = StaticCurrencyCatalog::new().with_site(SITE, CurrencyCode::USD, []);
        let strategy = DefaultCurrentCartStrategy::new(Arc::new(customers), Arc::new(currencies));
        let mut cart = cart();

        strategy.take_over_cart(&mut cart, &alice()).await.unwrap();

        assert_eq!(cart.currency, CurrencyCode::USD);
        assert_eq!(cart.customer_id, Some(CustomerId::new(10)));
    }
}
