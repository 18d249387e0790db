//! Core types for Cartwright.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod currency;
pub mod guid;
pub mod id;

pub use currency::{CurrencyCode, CurrencyCodeError, Price};
pub use guid::{CartGuid, CartGuidError};
pub use id::*;
