//! Domain models for cart resolution.
//!
//! [`Cart`] is owned by this crate. [`User`], [`Site`] and [`Customer`] are
//! snapshots of entities owned elsewhere; the resolver only reads them.

pub mod cart;
pub mod visitor;

pub use cart::{Address, Cart, CartItem, CartOwner, CartTotals};
pub use visitor::{Customer, Site, User};
