//! Core types for Boutique.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod comment;
pub mod email;
pub mod id;
pub mod price;
pub mod product;

pub use comment::{Comment, CommentThread, build_threads};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price, PriceError};
pub use product::{Category, Product};
