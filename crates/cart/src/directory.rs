//! Lookups into customer and currency data owned by other services.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use cartwright_core::{ContactId, CurrencyCode, SiteId, UserId};

use crate::error::Result;
use crate::models::{Customer, User};

/// Customer and contact records linked to users.
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    /// The customer registered as `user`, viewed on `site_id`.
    async fn customer_for_user(&self, user: &User, site_id: SiteId) -> Result<Option<Customer>>;

    /// The contact-management record `user` belongs to.
    async fn contact_for_user(&self, user: &User) -> Result<Option<ContactId>>;
}

/// Currencies available per site.
#[async_trait]
pub trait CurrencyCatalog: Send + Sync {
    /// Whether `currency` can currently be used on `site_id`.
    async fn is_enabled(&self, site_id: SiteId, currency: CurrencyCode) -> Result<bool>;

    /// The currency `site_id` prices in by default.
    async fn main_currency(&self, site_id: SiteId) -> Result<Option<CurrencyCode>>;
}

/// Customer directory backed by maps, filled at startup.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCustomerDirectory {
    customers: HashMap<(UserId, SiteId), Customer>,
    contacts: HashMap<UserId, ContactId>,
}

impl InMemoryCustomerDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `customer` as seen on `site_id`. The customer must carry a user ID.
    #[must_use]
    pub fn with_customer(mut self, site_id: SiteId, customer: Customer) -> Self {
        if let Some(user_id) = customer.user_id {
            self.customers.insert((user_id, site_id), customer);
        }
        self
    }

    /// Link `user_id` to a contact.
    #[must_use]
    pub fn with_contact(mut self, user_id: UserId, contact_id: ContactId) -> Self {
        self.contacts.insert(user_id, contact_id);
        self
    }
}

#[async_trait]
impl CustomerDirectory for InMemoryCustomerDirectory {
    async fn customer_for_user(&self, user: &User, site_id: SiteId) -> Result<Option<Customer>> {
        Ok(self.customers.get(&(user.id, site_id)).cloned())
    }

    async fn contact_for_user(&self, user: &User) -> Result<Option<ContactId>> {
        Ok(self.contacts.get(&user.id).copied())
    }
}

#[derive(Debug, Clone)]
struct SiteCurrencies {
    main: CurrencyCode,
    enabled: HashSet<CurrencyCode>,
}

/// Currency catalog with a fixed per-site configuration.
#[derive(Debug, Default, Clone)]
pub struct StaticCurrencyCatalog {
    sites: HashMap<SiteId, SiteCurrencies>,
}

impl StaticCurrencyCatalog {
    /// Create an empty catalog. Sites not registered have no enabled currency.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a site's main currency and the other currencies it accepts.
    /// The main currency is always enabled.
    #[must_use]
    pub fn with_site(
        mut self,
        site_id: SiteId,
        main: CurrencyCode,
        enabled: impl IntoIterator<Item = CurrencyCode>,
    ) -> Self {
        let mut enabled: HashSet<_> = enabled.into_iter().collect();
        enabled.insert(main);
        self.sites.insert(site_id, SiteCurrencies { main, enabled });
        self
    }

    /// Disable a currency on a site. Disabling the main currency is ignored.
    #[must_use]
    pub fn without_currency(mut self, site_id: SiteId, currency: CurrencyCode) -> Self {
        if let Some(site) = self.sites.get_mut(&site_id)
            && site.main != currency
        {
            site.enabled.remove(&currency);
        }
        self
    }
}

#[async_trait]
impl CurrencyCatalog for StaticCurrencyCatalog {
    async fn is_enabled(&self, site_id: SiteId, currency: CurrencyCode) -> Result<bool> {
        Ok(self
            .sites
            .get(&site_id)
            .is_some_and(|site| site.enabled.contains(&currency)))
    }

    async fn main_currency(&self, site_id: SiteId) -> Result<Option<CurrencyCode>> {
        Ok(self.sites.get(&site_id).map(|site| site.main))
    }
}

#[cfg(test)]
mod tests {
    use cartwright_core::CustomerId;

    use super::*;

    #[tokio::test]
    async fn test_customer_lookup_is_site_specific() {
        let alice = User::registered(UserId::new(2), "alice");
        let customer = Customer {
            id: CustomerId::new(10),
            user_id: Some(alice.id),
            preferred_currency: Some(CurrencyCode::EUR),
        };
        let directory = InMemoryCustomerDirectory::new()
            .with_customer(SiteId::new(1), customer.clone())
            .with_contact(alice.id, ContactId::new(77));

        assert_eq!(
            directory.customer_for_user(&alice, SiteId::new(1)).await.unwrap(),
            Some(customer)
        );
        assert_eq!(
            directory.customer_for_user(&alice, SiteId::new(2)).await.unwrap(),
            None
        );
        assert_eq!(
            directory.contact_for_user(&alice).await.unwrap(),
            Some(ContactId::new(77))
        );
    }

    #[tokio::test]
    async fn test_customer_without_user_is_not_indexed() {
        let alice = User::registered(UserId::new(2), "alice");
        let directory = InMemoryCustomerDirectory::new().with_customer(
            SiteId::new(1),
            Customer {
                id: CustomerId::new(10),
                user_id: None,
                preferred_currency: None,
            },
        );
        assert_eq!(
            directory.customer_for_user(&alice, SiteId::new(1)).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_currency_catalog() {
        let site = SiteId::new(1);
        let catalog = StaticCurrencyCatalog::new()
            .with_site(site, CurrencyCode::USD, [CurrencyCode::EUR, CurrencyCode::GBP])
            .without_currency(site, CurrencyCode::GBP)
            .without_currency(site, CurrencyCode::USD);

        assert!(catalog.is_enabled(site, CurrencyCode::USD).await.unwrap());
        assert!(catalog.is_enabled(site, CurrencyCode::EUR).await.unwrap());
        assert!(!catalog.is_enabled(site, CurrencyCode::GBP).await.unwrap());
        assert_eq!(
            catalog.main_currency(site).await.unwrap(),
            Some(CurrencyCode::USD)
        );

        let unknown = SiteId::new(99);
        assert!(!catalog.is_enabled(unknown, CurrencyCode::USD).await.unwrap());
        assert_eq!(catalog.main_currency(unknown).await.unwrap(), None);
    }
}
