//! Snapshots of the external entities a cart is resolved for.

use serde::{Deserialize, Serialize};

use cartwright_core::{CurrencyCode, CustomerId, SiteId, UserId};

/// The visitor a cart is being resolved for.
///
/// Every request has a user: anonymous visitors share the public user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User ID.
    pub id: UserId,
    /// Login name.
    pub user_name: String,
    /// Whether this is the public (anonymous) user.
    pub is_public: bool,
}

impl User {
    /// Login name of the public user.
    pub const PUBLIC_USER_NAME: &'static str = "public";

    /// The public (anonymous) user.
    #[must_use]
    pub fn public(id: UserId) -> Self {
        Self {
            id,
            user_name: Self::PUBLIC_USER_NAME.to_owned(),
            is_public: true,
        }
    }

    /// An authenticated user.
    #[must_use]
    pub fn registered(id: UserId, user_name: impl Into<String>) -> Self {
        Self {
            id,
            user_name: user_name.into(),
            is_public: false,
        }
    }

    /// Whether the visitor has signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        !self.is_public
    }
}

/// The site a cart is resolved on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    /// Site ID.
    pub id: SiteId,
    /// Code name (e.g. `dancing-goat`).
    pub code_name: String,
    /// Currency new carts start in and disabled currencies fall back to.
    pub main_currency: CurrencyCode,
}

impl Site {
    /// Create a site snapshot.
    #[must_use]
    pub fn new(id: SiteId, code_name: impl Into<String>, main_currency: CurrencyCode) -> Self {
        Self {
            id,
            code_name: code_name.into(),
            main_currency,
        }
    }
}

/// Site-specific view of a customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer ID.
    pub id: CustomerId,
    /// User the customer is registered as, if any.
    pub user_id: Option<UserId>,
    /// Currency the customer prefers on the site this view was loaded for.
    pub preferred_currency: Option<CurrencyCode>,
}
