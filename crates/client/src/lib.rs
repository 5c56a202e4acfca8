//! Marketplace client library.
//!
//! Talks to the marketplace REST backend and turns its responses into view
//! models that a front end can bind to whatever it renders with.
//!
//! # Layers
//!
//! - [`config`] - Environment-driven settings
//! - [`session`] - Persisted login state
//! - [`api`] - `reqwest` client and typed endpoints
//! - [`views`] - Listing, auth forms and dashboard, as state plus pure
//!   view-model functions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod session;
pub mod views;

pub use api::{ApiClient, MarketplaceApi};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore};
