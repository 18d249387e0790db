//! Cartwright Core - Shared types library.
//!
//! This crate provides the small value types used across all Cartwright components:
//! - `cart` - Current shopping cart resolution
//! - `cli` - Command-line tools for migrations and cart inspection
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, cart GUIDs, currencies and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
