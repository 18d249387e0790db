//! Construction of new carts.

use tracing::debug;

use cartwright_core::CartGuid;

use crate::models::{Cart, Site, User};

/// Builds brand-new, empty carts.
pub trait CartFactory: Send + Sync {
    /// Create an unsaved cart for `user` on `site`.
    ///
    /// Ownership is assigned afterwards by the strategy; a factory only
    /// decides the cart's initial state.
    fn create_cart(&self, site: &Site, user: &User) -> Cart;
}

/// Creates unowned carts priced in the site's main currency.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultCartFactory;

impl CartFactory for DefaultCartFactory {
    fn create_cart(&self, site: &Site, user: &User) -> Cart {
        let cart = Cart::new(CartGuid::new_v4(), site.id, site.main_currency);
        debug!(
            cart_guid = %cart.guid,
            site = %site.code_name,
            user_id = %user.id,
            "Created new cart"
        );
        cart
    }
}
