//! HTTP client for the commerce system's admin REST API.
//!
//! Three lookups back the enrichment fan-out: product variants (per-variant
//! stock and SKU), customer search by email, and order search by email with
//! line items. Each is a thin typed wrapper; the degrade-to-unknown policy
//! lives with the callers in `restock-pipeline`.

mod client;
mod error;
mod types;

pub use client::CommerceClient;
pub use error::CommerceError;
pub use types::{Customer, LineItem, Order, Variant};
