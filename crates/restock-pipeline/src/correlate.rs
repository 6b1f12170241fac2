//! Correlation engine: groups signups by subscriber, merges the two alert
//! signal sources, and decides per signup whether a matching alert followed.

use std::collections::HashMap;

use chrono::DateTime;

use restock_core::{is_restock_message, same_product, AlertSignal, SignupEvent};
use restock_events::{
    explicit_alert_from_event, message_subject_preview, signup_from_event, Event, EventsClient,
    EventsError,
};

/// Builds the signup index: subscriber id → signups in store order.
///
/// An absent signup metric is a valid "no data yet" state and yields an empty
/// index, not an error.
///
/// # Errors
///
/// Propagates transport-level [`EventsError`] from metric resolution or the
/// event fetch; callers degrade these to an empty index.
pub async fn build_signup_index(
    client: &EventsClient,
    signup_metric: &str,
) -> Result<HashMap<String, Vec<SignupEvent>>, EventsError> {
    let Some(metric_id) = client.resolve_metric_id(signup_metric).await? else {
        tracing::debug!(metric = signup_metric, "signup metric absent; empty index");
        return Ok(HashMap::new());
    };

    let events = client.fetch_events(&metric_id, None).await?;
    let mut index: HashMap<String, Vec<SignupEvent>> = HashMap::new();
    for event in &events {
        if let Some(signup) = signup_from_event(event) {
            index
                .entry(signup.subscriber_id.clone())
                .or_default()
                .push(signup);
        }
    }
    tracing::debug!(
        metric = signup_metric,
        events = events.len(),
        subscribers = index.len(),
        "built signup index"
    );
    Ok(index)
}

/// Builds the alert index: subscriber id → merged alert signals.
///
/// Two independent signal sources contribute evidence, union not
/// intersection: explicit signals from the dedicated alert metric come first,
/// then inferred signals recovered from generic received-message events that
/// the classifier accepts. A subscriber may carry both provenances.
///
/// # Errors
///
/// Propagates transport-level [`EventsError`]; callers degrade these to an
/// empty index.
pub async fn build_alert_index(
    client: &EventsClient,
    alert_metric: &str,
    message_metric: &str,
) -> Result<HashMap<String, Vec<AlertSignal>>, EventsError> {
    let (explicit_events, message_events) = tokio::join!(
        fetch_metric_events(client, alert_metric),
        fetch_metric_events(client, message_metric),
    );
    let explicit_events = explicit_events?;
    let message_events = message_events?;

    let mut index: HashMap<String, Vec<AlertSignal>> = HashMap::new();

    for event in &explicit_events {
        if let Some(alert) = explicit_alert_from_event(event) {
            index
                .entry(alert.subscriber_id.clone())
                .or_default()
                .push(alert);
        }
    }

    for event in &message_events {
        if let Some(alert) = inferred_alert_from_message(event) {
            index
                .entry(alert.subscriber_id.clone())
                .or_default()
                .push(alert);
        }
    }

    tracing::debug!(subscribers = index.len(), "built alert index");
    Ok(index)
}

/// Resolves a metric by name and fetches its events; absent metric → empty.
async fn fetch_metric_events(
    client: &EventsClient,
    metric_name: &str,
) -> Result<Vec<Event>, EventsError> {
    match client.resolve_metric_id(metric_name).await? {
        Some(metric_id) => client.fetch_events(&metric_id, None).await,
        None => {
            tracing::debug!(metric = metric_name, "metric absent; no events");
            Ok(Vec::new())
        }
    }
}

/// Recovers an inferred [`AlertSignal`] from a received-message event when the
/// classifier marks it as a restock notification. Inferred signals carry no
/// product attribution.
fn inferred_alert_from_message(event: &Event) -> Option<AlertSignal> {
    let subscriber_id = event.profile_id()?.to_string();
    let (subject, preview) = message_subject_preview(event);
    if !is_restock_message(&subject, &preview) {
        return None;
    }
    Some(AlertSignal {
        subscriber_id,
        product_id: None,
        timestamp: event
            .attributes
            .datetime
            .as_deref()
            .and_then(restock_core::parse_timestamp),
    })
}

/// Decides whether a signup was satisfied by any of the subscriber's alerts.
///
/// True iff some alert is timestamped strictly later than the signup AND
/// either carries no product id (inferred signals match any open signup) or
/// names the same normalized product.
///
/// An alert timestamped before or equal to the signup can never satisfy it.
/// A signup without a timestamp is treated as signed up at the epoch.
#[must_use]
pub fn resolve_alert_sent(signup: &SignupEvent, alerts: &[AlertSignal]) -> bool {
    let signup_at = signup.signup_at.unwrap_or(DateTime::UNIX_EPOCH);
    alerts.iter().any(|alert| {
        let Some(alert_at) = alert.timestamp else {
            return false;
        };
        if alert_at <= signup_at {
            return false;
        }
        match alert.product_id.as_deref() {
            None => true,
            Some(pid) => same_product(Some(pid), signup.product_id.as_deref()),
        }
    })
}
