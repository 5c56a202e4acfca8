//! Core types for the marketplace client.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod email;
pub mod id;
pub mod page;
pub mod price;
pub mod product;
pub mod session;

pub use address::{AddressComponent, compose_full_address};
pub use email::{Email, EmailError};
pub use id::*;
pub use page::{DEFAULT_PAGE_SIZE, PageCursor};
pub use price::Price;
pub use product::Product;
pub use session::Session;
