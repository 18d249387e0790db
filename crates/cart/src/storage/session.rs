//! Session storage backed by `tower-sessions`.

use async_trait::async_trait;
use tower_sessions::Session;

use cartwright_core::CartGuid;

use super::SessionCartStorage;
use crate::error::Result;

/// Session keys used by the cart resolver.
pub mod keys {
    /// Key for storing the current cart GUID.
    pub const CART_GUID: &str = "cart_guid";
}

/// Stores the cart GUID in the request's `tower-sessions` session.
#[derive(Debug, Clone)]
pub struct TowerSessionCartStorage {
    session: Session,
}

impl TowerSessionCartStorage {
    /// Wrap the session extracted for the current request.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

#[async_trait]
impl SessionCartStorage for TowerSessionCartStorage {
    async fn cart_guid(&self) -> Result<Option<CartGuid>> {
        let guid = self.session.get::<CartGuid>(keys::CART_GUID).await?;
        Ok(guid.and_then(CartGuid::non_empty))
    }

    async fn set_cart_guid(&self, guid: Option<CartGuid>) -> Result<()> {
        match guid.and_then(CartGuid::non_empty) {
            Some(guid) => self.session.insert(keys::CART_GUID, guid).await?,
            None => {
                self.session.remove::<CartGuid>(keys::CART_GUID).await?;
            }
        }
        Ok(())
    }

    fn session_available(&self) -> bool {
        // The session layer is always installed; a brand-new session still counts.
        true
    }
}
