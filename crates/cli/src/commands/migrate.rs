//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! cartwright-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `CART_DATABASE_URL` - `PostgreSQL` connection string for the cart database
//!
//! # Migration Files
//!
//! Cart migrations live in `crates/cart/migrations/`:
//! ```text
//! migrations/
//! └── 20260301000001_create_shopping_cart.sql
//! ```

use tracing::info;

use cartwright_cart::{CartConfig, db};

use super::CommandError;

/// Run cart database migrations.
///
/// # Errors
///
/// Returns an error if configuration is missing, the database is unreachable,
/// or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let config = CartConfig::from_env()?;

    info!("Connecting to cart database...");
    let pool = db::create_pool(&config.database_url).await?;

    info!("Running cart migrations...");
    sqlx::migrate!("../cart/migrations").run(&pool).await?;

    info!("Cart migrations complete!");
    Ok(())
}
