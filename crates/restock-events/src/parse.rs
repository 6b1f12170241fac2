//! Conversion of raw store events into domain types.
//!
//! Event properties are loosely structured and their key names drifted across
//! producers (the storefront form, the webhook receiver, older templates), so
//! every field is read through an ordered key-fallback list.

use restock_core::{parse_timestamp, AlertSignal, SignupEvent, SubscriberProfile};
use serde_json::Value;

use crate::types::{Event, Profile};

const PRODUCT_ID_KEYS: &[&str] = &["ProductID", "product_id", "ProductId", "$product_id"];
const VARIANT_ID_KEYS: &[&str] = &["VariantID", "variant_id", "VariantId", "$variant_id"];
const PRODUCT_TITLE_KEYS: &[&str] = &["ProductTitle", "product_title", "Title", "$title"];
const PRODUCT_URL_KEYS: &[&str] = &["ProductURL", "product_url", "URL", "$url"];
const SIGNUP_DATE_KEYS: &[&str] = &["SignupDate", "signup_date", "Timestamp", "timestamp"];
const SUBJECT_KEYS: &[&str] = &["Subject", "subject", "$subject"];
const PREVIEW_KEYS: &[&str] = &["Preview", "preview", "preview_text", "$preview_text"];

/// Reads the first present key as a string. Numbers are rendered to their
/// string form since product ids arrive both quoted and bare.
fn prop_str(props: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        match props.get(key) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

/// Builds a [`SignupEvent`] from a raw signup-metric event.
///
/// Returns `None` when the store did not attribute the event to a profile;
/// without a subscriber there is nothing to correlate. A missing explicit
/// signup timestamp falls back to the event's own record timestamp.
#[must_use]
pub fn signup_from_event(event: &Event) -> Option<SignupEvent> {
    let subscriber_id = event.profile_id()?.to_string();
    let props = &event.attributes.event_properties;

    let signup_at = prop_str(props, SIGNUP_DATE_KEYS)
        .as_deref()
        .and_then(parse_timestamp)
        .or_else(|| {
            event
                .attributes
                .datetime
                .as_deref()
                .and_then(parse_timestamp)
        });

    Some(SignupEvent {
        subscriber_id,
        product_id: prop_str(props, PRODUCT_ID_KEYS),
        variant_id: prop_str(props, VARIANT_ID_KEYS),
        product_title: prop_str(props, PRODUCT_TITLE_KEYS),
        product_url: prop_str(props, PRODUCT_URL_KEYS),
        signup_at,
    })
}

/// Builds an explicit [`AlertSignal`] from a dedicated alert-metric event.
///
/// Explicit signals carry product attribution from the webhook payload; the
/// timestamp is the event's record timestamp.
#[must_use]
pub fn explicit_alert_from_event(event: &Event) -> Option<AlertSignal> {
    let subscriber_id = event.profile_id()?.to_string();
    let props = &event.attributes.event_properties;

    Some(AlertSignal {
        subscriber_id,
        product_id: prop_str(props, PRODUCT_ID_KEYS),
        timestamp: event
            .attributes
            .datetime
            .as_deref()
            .and_then(parse_timestamp),
    })
}

/// Extracts (subject, preview) text from a generic received-message event,
/// for the restock classifier. Missing fields read as empty strings.
#[must_use]
pub fn message_subject_preview(event: &Event) -> (String, String) {
    let props = &event.attributes.event_properties;
    (
        prop_str(props, SUBJECT_KEYS).unwrap_or_default(),
        prop_str(props, PREVIEW_KEYS).unwrap_or_default(),
    )
}

/// Converts a raw store profile into the domain [`SubscriberProfile`].
#[must_use]
pub fn subscriber_from_profile(profile: &Profile) -> SubscriberProfile {
    SubscriberProfile {
        id: profile.id.clone(),
        email: profile.attributes.email.clone(),
        first_name: profile.attributes.first_name.clone(),
        last_name: profile.attributes.last_name.clone(),
        created_at: profile
            .attributes
            .created
            .as_deref()
            .and_then(parse_timestamp),
    }
}
