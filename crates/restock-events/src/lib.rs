//! HTTP client for the external event/profile store.
//!
//! The store exposes JSON:API-style collections: metrics addressed by opaque
//! id, events filtered by metric (and optionally profile), and audience lists
//! with their member profiles. All collections page via `links.next` cursors.
//!
//! Fetch policy follows the pipeline's degrade-gracefully rule: event fetches
//! turn any non-success response into an empty sequence with a warning, while
//! profile-list fetches propagate failure because the profile list is the
//! seed set for the whole run.

mod client;
mod error;
mod parse;
mod retry;
mod types;

pub use client::EventsClient;
pub use error::EventsError;
pub use parse::{
    explicit_alert_from_event, message_subject_preview, signup_from_event, subscriber_from_profile,
};
pub use types::{Event, Metric, Profile};
