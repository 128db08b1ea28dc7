//! Client side of the Threadmark API.
//!
//! [`ApiClient`] speaks HTTP to the server; [`checkout::run_checkout`] drives
//! the storefront flow: capture previews, create the order, match cart lines
//! to order items, then upload screenshots.

pub mod api;
pub mod checkout;
pub mod config;
pub mod error;

pub use api::{ApiClient, OrderApi};
pub use config::ClientConfig;
pub use error::ClientError;
