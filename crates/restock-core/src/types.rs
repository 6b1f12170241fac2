//! Domain model for the reconciliation pipeline.
//!
//! These types are the pipeline's internal currency: raw store events are
//! parsed into [`SignupEvent`] / [`AlertSignal`], correlated per
//! [`SubscriberProfile`], and joined with an [`Enrichment`] into the output
//! [`EnrichedSignupRecord`]. Records are rebuilt from scratch on every run
//! and never persisted.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

/// One customer's expressed interest in one product/variant.
///
/// Immutable once read from the store. `signup_at` is the customer-visible
/// signup time; when the store record carried no explicit signup timestamp
/// the event's own record timestamp substitutes (done at parse time).
#[derive(Debug, Clone)]
pub struct SignupEvent {
    pub subscriber_id: String,
    /// May arrive as a namespaced global id; normalize before comparing.
    pub product_id: Option<String>,
    pub variant_id: Option<String>,
    pub product_title: Option<String>,
    pub product_url: Option<String>,
    pub signup_at: Option<DateTime<Utc>>,
}

/// Evidence that a restock notification reached a subscriber.
///
/// Two provenances share this shape: explicit signals from the dedicated
/// alert metric carry a product id; inferred signals recovered from generic
/// received-message events carry none.
#[derive(Debug, Clone)]
pub struct AlertSignal {
    pub subscriber_id: String,
    /// Absent for inferred signals; treated as matching any product.
    pub product_id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Identity attributes of a customer in the event store.
#[derive(Debug, Clone)]
pub struct SubscriberProfile {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Profile-creation time; substitutes as the signup timestamp for the
    /// zero-signup fallback record.
    pub created_at: Option<DateTime<Utc>>,
}

impl SubscriberProfile {
    /// Joins first and last name, tolerating either being absent.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(f), Some(l)) => Some(format!("{f} {l}")),
            (Some(f), None) => Some(f.to_string()),
            (None, Some(l)) => Some(l.to_string()),
            (None, None) => None,
        }
    }
}

/// Per-signup facts pulled from the commerce system.
///
/// Every field degrades independently: a failed lookup leaves its field at
/// the unknown/false value without touching the others.
#[derive(Debug, Clone, Default)]
pub struct Enrichment {
    pub current_inventory: Option<i64>,
    pub sku: Option<String>,
    pub commerce_customer_id: Option<String>,
    pub ordered: bool,
}

/// The unit of output: one (subscriber, signup) pair with its reconciled
/// alert/order status and live commerce facts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedSignupRecord {
    /// Synthetic composite id: `subscriberId + productId + signupTimestamp`,
    /// or the bare subscriber id for the zero-signup fallback record.
    pub id: String,
    pub subscriber_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub product_id: Option<String>,
    pub variant_id: Option<String>,
    pub product_title: Option<String>,
    pub product_url: Option<String>,
    pub signup_date: Option<DateTime<Utc>>,
    pub alert_sent: bool,
    pub ordered: bool,
    pub current_inventory: Option<i64>,
    pub sku: Option<String>,
    pub commerce_customer_id: Option<String>,
}

impl EnrichedSignupRecord {
    /// Sort key for the output ordering: signup timestamp descending, with an
    /// absent or unparseable timestamp sorting as the epoch start (last).
    #[must_use]
    pub fn sort_key(&self) -> DateTime<Utc> {
        self.signup_date.unwrap_or(DateTime::UNIX_EPOCH)
    }
}

/// Parses an ISO 8601 timestamp, tolerating a missing UTC offset.
///
/// The event store emits RFC 3339 (`2024-05-01T12:00:00+00:00`); some
/// webhook-sourced properties drop the offset. Offset-less values are read
/// as UTC. Returns `None` for anything unparseable.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
