//! Integration tests for the `PostgreSQL` cart repository.
//!
//! These need a disposable database reachable through `CART_DATABASE_URL`;
//! migrations are applied on connect.

use secrecy::SecretString;
use sqlx::PgPool;

use cartwright_cart::{
    Address, CartOwner, CartRepository, PgCartRepository, User, db::create_pool,
};
use cartwright_core::{CartGuid, CustomerId, ShippingOptionId, UserId};
use cartwright_integration_tests::{cart_with_items, euro_site, home_site};

async fn test_pool() -> PgPool {
    let url = std::env::var("CART_DATABASE_URL").expect("CART_DATABASE_URL must be set");
    let pool = create_pool(&SecretString::from(url)).await.unwrap();
    sqlx::migrate!("../cart/migrations").run(&pool).await.unwrap();
    pool
}

/// A user ID unlikely to collide with other test runs.
fn unique_user() -> User {
    let id = i32::try_from(CartGuid::new_v4().as_uuid().as_u128() % 1_000_000_000).unwrap();
    User::registered(UserId::new(id), "pg-test")
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (CART_DATABASE_URL)"]
async fn test_set_and_get_cart() {
    let repo = PgCartRepository::new(test_pool().await);
    let mut cart = cart_with_items(&home_site(), 2);
    cart.customer_id = Some(CustomerId::new(5));
    cart.shipping_option_id = Some(ShippingOptionId::new(2));
    cart.billing_address = Some(Address {
        name: "Alice".to_string(),
        city: "Springfield".to_string(),
        ..Address::default()
    });
    cart.note = Some("gift".to_string());

    repo.set_cart(&cart).await.unwrap();
    let loaded = repo.cart(cart.guid).await.unwrap().unwrap();

    assert_eq!(loaded.guid, cart.guid);
    assert_eq!(loaded.owner, CartOwner::Unowned);
    assert_eq!(loaded.items, cart.items);
    assert_eq!(loaded.billing_address, cart.billing_address);
    assert_eq!(loaded.customer_id, cart.customer_id);
    assert_eq!(loaded.note, cart.note);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (CART_DATABASE_URL)"]
async fn test_set_cart_overwrites_existing_row() {
    let repo = PgCartRepository::new(test_pool().await);
    let mut cart = cart_with_items(&home_site(), 1);
    repo.set_cart(&cart).await.unwrap();

    let user = unique_user();
    cart.owner = CartOwner::Registered(user.id);
    cart.private_data_cleared = true;
    repo.set_cart(&cart).await.unwrap();

    let loaded = repo.cart(cart.guid).await.unwrap().unwrap();
    assert_eq!(loaded.owner, CartOwner::Registered(user.id));
    assert!(loaded.private_data_cleared);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (CART_DATABASE_URL)"]
async fn test_missing_and_empty_guid_return_none() {
    let repo = PgCartRepository::new(test_pool().await);
    assert!(repo.cart(CartGuid::new_v4()).await.unwrap().is_none());
    assert!(repo.cart(CartGuid::EMPTY).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (CART_DATABASE_URL)"]
async fn test_users_cart_is_latest_on_site() {
    let repo = PgCartRepository::new(test_pool().await);
    let user = unique_user();

    let mut older = cart_with_items(&home_site(), 1);
    older.owner = CartOwner::Registered(user.id);
    repo.set_cart(&older).await.unwrap();

    let mut newer = cart_with_items(&home_site(), 2);
    newer.owner = CartOwner::Registered(user.id);
    newer.touch();
    repo.set_cart(&newer).await.unwrap();

    let mut elsewhere = cart_with_items(&euro_site(), 3);
    elsewhere.owner = CartOwner::Registered(user.id);
    elsewhere.touch();
    repo.set_cart(&elsewhere).await.unwrap();

    let found = repo.users_cart(&user, &home_site()).await.unwrap().unwrap();
    assert_eq!(found.guid, newer.guid);

    repo.delete_users_cart(&user, &home_site()).await.unwrap();
    assert!(repo.users_cart(&user, &home_site()).await.unwrap().is_none());
    assert!(repo.cart(older.guid).await.unwrap().is_none());
    // Other sites are untouched
    assert!(repo.cart(elsewhere.guid).await.unwrap().is_some());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (CART_DATABASE_URL)"]
async fn test_public_user_has_no_stored_cart() {
    let repo = PgCartRepository::new(test_pool().await);
    let public = User::public(UserId::new(1));
    let mut cart = cart_with_items(&home_site(), 1);
    cart.owner = CartOwner::Public(public.id);
    repo.set_cart(&cart).await.unwrap();

    assert!(repo.users_cart(&public, &home_site()).await.unwrap().is_none());
    repo.delete_users_cart(&public, &home_site()).await.unwrap();
    assert!(repo.cart(cart.guid).await.unwrap().is_some());
}
