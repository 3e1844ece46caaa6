//! Boutique Core - Shared domain types.
//!
//! This crate provides the domain model used by the storefront:
//! - [`types`] - Newtype ids, prices, emails, products, categories and comments
//! - [`cart`] - The session cart: a product id to quantity map and its priced view
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database access,
//! no HTTP. Catalog lookups are passed in as closures so the cart can be priced
//! anywhere.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartItem, FullCart};
pub use types::*;
