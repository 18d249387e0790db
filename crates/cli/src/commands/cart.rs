//! Cart inspection and maintenance commands.
//!
//! # Usage
//!
//! ```bash
//! cartwright-cli cart show 6f1c2a4e-8d0b-4a53-9a57-2f6f0d2b1c11
//! cartwright-cli cart delete-user-cart --user-id 42 --site-id 1
//! ```
//!
//! # Environment Variables
//!
//! - `CART_DATABASE_URL` - `PostgreSQL` connection string for the cart database

use tracing::info;

use cartwright_cart::{CartConfig, CartRepository, PgCartRepository, Site, User, db};
use cartwright_core::{CartGuid, CurrencyCode, SiteId, UserId};

use super::CommandError;

async fn repository() -> Result<PgCartRepository, CommandError> {
    let config = CartConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    Ok(PgCartRepository::new(pool))
}

/// Print the cart stored under `guid` as pretty JSON.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the cart does not exist.
pub async fn show(guid: CartGuid) -> Result<(), CommandError> {
    let repo = repository().await?;

    let cart = repo
        .cart(guid)
        .await?
        .ok_or_else(|| CommandError::CartNotFound(guid.to_string()))?;

    let json = serde_json::to_string_pretty(&cart)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{json}");
    }

    Ok(())
}

/// Delete the carts a registered user owns on a site.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the delete fails.
pub async fn delete_user_cart(user_id: UserId, site_id: SiteId) -> Result<(), CommandError> {
    let repo = repository().await?;

    // Only the IDs take part in the lookup.
    let user = User::registered(user_id, "");
    let site = Site::new(site_id, "", CurrencyCode::default());

    repo.delete_users_cart(&user, &site).await?;

    info!(user_id = %user_id, site_id = %site_id, "Deleted user's carts");
    Ok(())
}
