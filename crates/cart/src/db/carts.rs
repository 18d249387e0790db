//! Cart repository for `PostgreSQL`.
//!
//! Queries are checked at runtime (`query_as` with `FromRow`), so the crate
//! builds without a live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::{debug, instrument};

use cartwright_core::{
    CartGuid, ContactId, CurrencyCode, CustomerId, PaymentOptionId, ShippingOptionId, SiteId,
    UserId,
};

use super::RepositoryError;
use crate::error::Result;
use crate::models::{Address, Cart, CartItem, CartOwner, CartTotals, Site, User};
use crate::storage::CartRepository;

const SELECT_COLUMNS: &str = r"
    SELECT guid, site_id, owner_kind, user_id, contact_id, customer_id, currency,
           items, billing_address, shipping_address, company_address,
           shipping_option_id, payment_option_id, payment_gateway_data, note,
           private_data_cleared, subtotal, total, last_update
    FROM cart.shopping_cart
";

/// Row shape of `cart.shopping_cart`.
#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    guid: CartGuid,
    site_id: SiteId,
    owner_kind: String,
    user_id: Option<UserId>,
    contact_id: Option<ContactId>,
    customer_id: Option<CustomerId>,
    currency: String,
    items: Json<Vec<CartItem>>,
    billing_address: Option<Json<Address>>,
    shipping_address: Option<Json<Address>>,
    company_address: Option<Json<Address>>,
    shipping_option_id: Option<ShippingOptionId>,
    payment_option_id: Option<PaymentOptionId>,
    payment_gateway_data: Json<serde_json::Map<String, serde_json::Value>>,
    note: Option<String>,
    private_data_cleared: bool,
    subtotal: Decimal,
    total: Decimal,
    last_update: DateTime<Utc>,
}

impl TryFrom<CartRow> for Cart {
    type Error = RepositoryError;

    fn try_from(row: CartRow) -> std::result::Result<Self, Self::Error> {
        let owner = match (row.owner_kind.as_str(), row.user_id) {
            ("unowned", None) => CartOwner::Unowned,
            ("public", Some(id)) => CartOwner::Public(id),
            ("registered", Some(id)) => CartOwner::Registered(id),
            (kind, user_id) => {
                return Err(RepositoryError::DataCorruption(format!(
                    "cart {} has owner kind {kind:?} with user {user_id:?}",
                    row.guid
                )));
            }
        };

        let currency = row.currency.parse::<CurrencyCode>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid currency in database: {e}"))
        })?;

        let items = row.items.0;
        let item_count = items
            .iter()
            .try_fold(0u32, |count, item| count.checked_add(item.quantity))
            .ok_or_else(|| {
                RepositoryError::DataCorruption(format!(
                    "cart {} item quantities overflow",
                    row.guid
                ))
            })?;

        Ok(Self {
            guid: row.guid,
            site_id: row.site_id,
            owner,
            contact_id: row.contact_id,
            customer_id: row.customer_id,
            currency,
            items,
            billing_address: row.billing_address.map(|a| a.0),
            shipping_address: row.shipping_address.map(|a| a.0),
            company_address: row.company_address.map(|a| a.0),
            shipping_option_id: row.shipping_option_id,
            payment_option_id: row.payment_option_id,
            payment_gateway_data: row.payment_gateway_data.0,
            note: row.note,
            private_data_cleared: row.private_data_cleared,
            totals: CartTotals {
                item_count,
                subtotal: row.subtotal,
                total: row.total,
            },
            last_update: row.last_update,
        })
    }
}

const fn owner_kind(owner: CartOwner) -> &'static str {
    match owner {
        CartOwner::Unowned => "unowned",
        CartOwner::Public(_) => "public",
        CartOwner::Registered(_) => "registered",
    }
}

/// Repository for cart database operations.
#[derive(Clone)]
pub struct PgCartRepository {
    pool: PgPool,
}

impl PgCartRepository {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartRepository for PgCartRepository {
    #[instrument(skip(self))]
    async fn cart(&self, guid: CartGuid) -> Result<Option<Cart>> {
        if guid.is_empty() {
            return Ok(None);
        }
        let sql = format!("{SELECT_COLUMNS} WHERE guid = $1");
        let row = sqlx::query_as::<_, CartRow>(&sql)
            .bind(guid)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        Ok(row.map(Cart::try_from).transpose()?)
    }

    #[instrument(skip(self, user, site), fields(user_id = %user.id, site_id = %site.id))]
    async fn users_cart(&self, user: &User, site: &Site) -> Result<Option<Cart>> {
        if !user.is_authenticated() {
            return Ok(None);
        }
        let sql = format!(
            "{SELECT_COLUMNS} WHERE owner_kind = 'registered' AND user_id = $1 AND site_id = $2 \
             ORDER BY last_update DESC LIMIT 1"
        );
        let row = sqlx::query_as::<_, CartRow>(&sql)
            .bind(user.id)
            .bind(site.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        Ok(row.map(Cart::try_from).transpose()?)
    }

    #[instrument(skip(self, cart), fields(cart_guid = %cart.guid))]
    async fn set_cart(&self, cart: &Cart) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO cart.shopping_cart (
                guid, site_id, owner_kind, user_id, contact_id, customer_id, currency,
                items, billing_address, shipping_address, company_address,
                shipping_option_id, payment_option_id, payment_gateway_data, note,
                private_data_cleared, subtotal, total, last_update
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            ON CONFLICT (guid) DO UPDATE SET
                site_id = EXCLUDED.site_id,
                owner_kind = EXCLUDED.owner_kind,
                user_id = EXCLUDED.user_id,
                contact_id = EXCLUDED.contact_id,
                customer_id = EXCLUDED.customer_id,
                currency = EXCLUDED.currency,
                items = EXCLUDED.items,
                billing_address = EXCLUDED.billing_address,
                shipping_address = EXCLUDED.shipping_address,
                company_address = EXCLUDED.company_address,
                shipping_option_id = EXCLUDED.shipping_option_id,
                payment_option_id = EXCLUDED.payment_option_id,
                payment_gateway_data = EXCLUDED.payment_gateway_data,
                note = EXCLUDED.note,
                private_data_cleared = EXCLUDED.private_data_cleared,
                subtotal = EXCLUDED.subtotal,
                total = EXCLUDED.total,
                last_update = EXCLUDED.last_update
            ",
        )
        .bind(cart.guid)
        .bind(cart.site_id)
        .bind(owner_kind(cart.owner))
        .bind(cart.owner.user_id())
        .bind(cart.contact_id)
        .bind(cart.customer_id)
        .bind(cart.currency.code())
        .bind(Json(&cart.items))
        .bind(cart.billing_address.as_ref().map(Json))
        .bind(cart.shipping_address.as_ref().map(Json))
        .bind(cart.company_address.as_ref().map(Json))
        .bind(cart.shipping_option_id)
        .bind(cart.payment_option_id)
        .bind(Json(&cart.payment_gateway_data))
        .bind(cart.note.as_deref())
        .bind(cart.private_data_cleared)
        .bind(cart.totals.subtotal)
        .bind(cart.totals.total)
        .bind(cart.last_update)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_check_violation()
            {
                return RepositoryError::Conflict(format!("cart {} rejected: {db_err}", cart.guid));
            }
            RepositoryError::Database(e)
        })?;

        debug!("Cart saved");
        Ok(())
    }

    #[instrument(skip(self, user, site), fields(user_id = %user.id, site_id = %site.id))]
    async fn delete_users_cart(&self, user: &User, site: &Site) -> Result<()> {
        if !user.is_authenticated() {
            return Ok(());
        }
        let result = sqlx::query(
            r"
            DELETE FROM cart.shopping_cart
            WHERE owner_kind = 'registered' AND user_id = $1 AND site_id = $2
            ",
        )
        .bind(user.id)
        .bind(site.id)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        debug!(deleted = result.rows_affected(), "Deleted user's carts");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> CartRow {
        CartRow {
            guid: CartGuid::new_v4(),
            site_id: SiteId::new(1),
            owner_kind: "registered".to_string(),
            user_id: Some(UserId::new(2)),
            contact_id: None,
            customer_id: Some(CustomerId::new(10)),
            currency: "EUR".to_string(),
            items: Json(vec![CartItem::new(
                cartwright_core::SkuId::new(1),
                "Beans",
                3,
                Decimal::new(450, 2),
            )]),
            billing_address: None,
            shipping_address: None,
            company_address: None,
            shipping_option_id: None,
            payment_option_id: None,
            payment_gateway_data: Json(serde_json::Map::new()),
            note: Some("gift".to_string()),
            private_data_cleared: false,
            subtotal: Decimal::new(1350, 2),
            total: Decimal::new(1350, 2),
            last_update: Utc::now(),
        }
    }

    #[test]
    fn test_row_to_cart() {
        let cart = Cart::try_from(row()).unwrap();

        assert_eq!(cart.owner, CartOwner::Registered(UserId::new(2)));
        assert_eq!(cart.currency, CurrencyCode::EUR);
        assert_eq!(cart.totals.item_count, 3);
        assert_eq!(cart.totals.subtotal, Decimal::new(1350, 2));
        assert_eq!(cart.note.as_deref(), Some("gift"));
    }

    #[test]
    fn test_row_with_inconsistent_owner_is_corrupt() {
        let mut bad = row();
        bad.user_id = None;
        assert!(matches!(
            Cart::try_from(bad),
            Err(RepositoryError::DataCorruption(_))
        ));

        let mut bad = row();
        bad.owner_kind = "unowned".to_string();
        assert!(matches!(
            Cart::try_from(bad),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_row_with_unknown_currency_is_corrupt() {
        let mut bad = row();
        bad.currency = "DOGE".to_string();
        assert!(matches!(
            Cart::try_from(bad),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_row_with_overflowing_quantities_is_corrupt() {
        let mut bad = row();
        bad.items.0.push(CartItem::new(
            cartwright_core::SkuId::new(2),
            "Bulk",
            u32::MAX,
            Decimal::ONE,
        ));
        assert!(matches!(
            Cart::try_from(bad),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_owner_kind_labels() {
        assert_eq!(owner_kind(CartOwner::Unowned), "unowned");
        assert_eq!(owner_kind(CartOwner::Public(UserId::new(1))), "public");
        assert_eq!(owner_kind(CartOwner::Registered(UserId::new(1))), "registered");
    }
}
