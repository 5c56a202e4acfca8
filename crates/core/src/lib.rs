//! Marketplace Core - Shared types library.
//!
//! This crate provides common types used across the marketplace client:
//! - `client` - HTTP client, session storage and views
//! - `cli` - Terminal front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure state - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, plus the product,
//!   session and page cursor models

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
