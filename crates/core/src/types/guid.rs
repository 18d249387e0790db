//! Cart identifier token.
//!
//! Carts are looked up from client-visible storage (cookies, sessions) by a
//! GUID rather than by their database key. The nil UUID is the empty sentinel:
//! it is what gets written when a visitor has no cart and it never identifies
//! a stored cart.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur when parsing a [`CartGuid`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum CartGuidError {
    /// The input is not a UUID.
    #[error("invalid cart guid: {0}")]
    Invalid(String),
}

/// Public identifier of a shopping cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartGuid(Uuid);

impl CartGuid {
    /// The empty sentinel written when no cart is current.
    pub const EMPTY: Self = Self(Uuid::nil());

    /// Generate a fresh random GUID.
    #[must_use]
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Whether this is the empty sentinel.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_nil()
    }

    /// Returns `None` for the empty sentinel.
    #[must_use]
    pub fn non_empty(self) -> Option<Self> {
        if self.is_empty() { None } else { Some(self) }
    }
}

impl fmt::Display for CartGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for CartGuid {
    type Err = CartGuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| CartGuidError::Invalid(s.to_owned()))
    }
}

impl From<Uuid> for CartGuid {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<CartGuid> for Uuid {
    fn from(guid: CartGuid) -> Self {
        guid.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for CartGuid {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Uuid as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Uuid as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for CartGuid {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let uuid = <Uuid as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(uuid))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for CartGuid {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Uuid as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
