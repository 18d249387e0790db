//! Shopping cart domain type.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cartwright_core::{
    AddressId, CartGuid, ContactId, CurrencyCode, CustomerId, PaymentOptionId, ShippingOptionId,
    SiteId, SkuId, UserId,
};

use super::visitor::User;

/// Who a cart belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "user_id", rename_all = "snake_case")]
pub enum CartOwner {
    /// Nobody has claimed the cart.
    #[default]
    Unowned,
    /// Bound to the public (anonymous) user.
    Public(UserId),
    /// Bound to an authenticated user.
    Registered(UserId),
}

impl CartOwner {
    /// Owner value for binding a cart to `user`.
    #[must_use]
    pub const fn of(user: &User) -> Self {
        if user.is_public {
            Self::Public(user.id)
        } else {
            Self::Registered(user.id)
        }
    }

    /// The owning user's ID, if the cart is owned.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Unowned => None,
            Self::Public(id) | Self::Registered(id) => Some(*id),
        }
    }

    /// Whether the owner is an authenticated user.
    #[must_use]
    pub const fn is_registered(&self) -> bool {
        matches!(self, Self::Registered(_))
    }
}

/// A line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product SKU.
    pub sku_id: SkuId,
    /// Display name at the time the item was added.
    pub name: String,
    /// Number of units.
    pub quantity: u32,
    /// Price per unit in the cart currency.
    pub unit_price: Decimal,
}

impl CartItem {
    /// Create a cart line.
    #[must_use]
    pub fn new(sku_id: SkuId, name: impl Into<String>, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            sku_id,
            name: name.into(),
            quantity,
            unit_price,
        }
    }

    /// `unit_price * quantity`, or `None` when it does not fit a `Decimal`.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

/// A postal address attached to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Address {
    /// Address book entry this was copied from.
    pub id: Option<AddressId>,
    pub name: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub zip: String,
    /// ISO 3166-1 alpha-2.
    pub country_code: String,
    pub phone: Option<String>,
}

/// Derived totals, recomputed by a [`CartEvaluator`](crate::CartEvaluator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CartTotals {
    /// Number of units across all lines.
    pub item_count: u32,
    /// Sum of line totals.
    pub subtotal: Decimal,
    /// Amount due.
    pub total: Decimal,
}

/// An in-progress order.
///
/// A cart belongs to exactly one site. Personal selections (customer,
/// addresses, shipping and payment choices, note) are what
/// [`CurrentCartStrategy::anonymize_cart`](crate::CurrentCartStrategy::anonymize_cart)
/// strips before a cart is handed to a different visitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    /// Public identifier.
    pub guid: CartGuid,
    /// Site the cart was created on.
    pub site_id: SiteId,
    pub owner: CartOwner,
    /// Contact-management record linked to the owner.
    pub contact_id: Option<ContactId>,
    pub customer_id: Option<CustomerId>,
    pub currency: CurrencyCode,
    pub items: Vec<CartItem>,
    pub billing_address: Option<Address>,
    pub shipping_address: Option<Address>,
    pub company_address: Option<Address>,
    pub shipping_option_id: Option<ShippingOptionId>,
    pub payment_option_id: Option<PaymentOptionId>,
    /// Opaque data stored by the payment gateway integration.
    pub payment_gateway_data: serde_json::Map<String, serde_json::Value>,
    pub note: Option<String>,
    /// Set once private data has been stripped.
    pub private_data_cleared: bool,
    pub totals: CartTotals,
    pub last_update: DateTime<Utc>,
}

impl Cart {
    /// Create an empty, unowned cart.
    #[must_use]
    pub fn new(guid: CartGuid, site_id: SiteId, currency: CurrencyCode) -> Self {
        Self {
            guid,
            site_id,
            owner: CartOwner::Unowned,
            contact_id: None,
            customer_id: None,
            currency,
            items: Vec::new(),
            billing_address: None,
            shipping_address: None,
            company_address: None,
            shipping_option_id: None,
            payment_option_id: None,
            payment_gateway_data: serde_json::Map::new(),
            note: None,
            private_data_cleared: false,
            totals: CartTotals::default(),
            last_update: Utc::now(),
        }
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of units across all lines, saturating at `u32::MAX`.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |count: u32, item| count.saturating_add(item.quantity))
    }

    /// Whether `user` is the cart's current owner.
    #[must_use]
    pub fn is_owned_by(&self, user: &User) -> bool {
        self.owner.user_id() == Some(user.id)
    }

    /// Append a line, merging with an existing line for the same SKU.
    pub fn add_item(&mut self, item: CartItem) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.sku_id == item.sku_id) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            self.items.push(item);
        }
        self.touch();
    }

    /// Bump the last-update timestamp.
    pub fn touch(&mut self) {
        self.last_update = Utc::now();
    }
}
