//! Single-run pipeline orchestration: fan out the upstream fetches, correlate,
//! enrich, assemble.

use std::collections::HashMap;

use futures::future::join_all;

use restock_commerce::CommerceClient;
use restock_core::{
    AlertSignal, AppConfig, EnrichedSignupRecord, SignupEvent, SubscriberProfile,
};
use restock_events::{subscriber_from_profile, EventsClient, EventsError, Profile};

use crate::error::PipelineError;
use crate::{assemble, correlate, enrich};

/// Runs one full reconciliation: fetches the profile list, signup index, and
/// alert index concurrently, resolves alert delivery per signup, enriches
/// each signup from the commerce system, and returns the ordered record list.
///
/// The profile-list fetch is the only fatal upstream: the signup and alert
/// indexes degrade to empty with a warning, and every enrichment failure
/// degrades a single field.
///
/// # Errors
///
/// - [`PipelineError::Events`] / [`PipelineError::Commerce`] if a client
///   cannot be constructed from the configuration.
/// - [`PipelineError::ProfileFetch`] if the profile list cannot be fetched.
pub async fn run_reconciliation(
    config: &AppConfig,
) -> Result<Vec<EnrichedSignupRecord>, PipelineError> {
    let events = events_client(config)?;
    let commerce = commerce_client(config)?;
    if commerce.is_none() {
        tracing::info!("commerce credentials absent; enrichment fields will report unknown");
    }

    let (profiles, signups, alerts) = tokio::join!(
        fetch_profiles(&events, &config.list_name),
        correlate::build_signup_index(&events, &config.signup_metric),
        correlate::build_alert_index(&events, &config.alert_metric, &config.message_metric),
    );

    let profiles = profiles.map_err(PipelineError::ProfileFetch)?;
    let signups = signups.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "signup index unavailable; continuing with empty index");
        HashMap::new()
    });
    let alerts = alerts.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "alert index unavailable; continuing with empty index");
        HashMap::new()
    });

    let commerce_ref = commerce.as_ref();
    let mut tasks = Vec::new();
    for profile in &profiles {
        let subscriber = subscriber_from_profile(profile);
        let subscriber_alerts = alerts.get(&subscriber.id).cloned().unwrap_or_default();
        match signups.get(&subscriber.id) {
            Some(subscriber_signups) if !subscriber_signups.is_empty() => {
                for signup in subscriber_signups {
                    tasks.push(build_record(
                        commerce_ref,
                        subscriber.clone(),
                        Some(signup.clone()),
                        subscriber_alerts.clone(),
                    ));
                }
            }
            _ => {
                tasks.push(build_record(commerce_ref, subscriber, None, Vec::new()));
            }
        }
    }

    let mut records = join_all(tasks).await;
    assemble::sort_records(&mut records);

    tracing::info!(
        profiles = profiles.len(),
        records = records.len(),
        "reconciliation run complete"
    );
    Ok(records)
}

/// Produces one output record: correlation, then enrichment fan-out.
///
/// `signup = None` is the zero-signup fallback: a placeholder signup carrying
/// no product and the profile-creation timestamp drives enrichment, so the
/// customer-id lookup still runs while product-bound lookups short-circuit.
async fn build_record(
    commerce: Option<&CommerceClient>,
    subscriber: SubscriberProfile,
    signup: Option<SignupEvent>,
    alerts: Vec<AlertSignal>,
) -> EnrichedSignupRecord {
    match signup {
        Some(signup) => {
            let alert_sent = correlate::resolve_alert_sent(&signup, &alerts);
            let enrichment =
                enrich::enrich_signup(commerce, &signup, subscriber.email.as_deref()).await;
            assemble::signup_record(&subscriber, &signup, alert_sent, enrichment)
        }
        None => {
            let placeholder = SignupEvent {
                subscriber_id: subscriber.id.clone(),
                product_id: None,
                variant_id: None,
                product_title: None,
                product_url: None,
                signup_at: subscriber.created_at,
            };
            let enrichment =
                enrich::enrich_signup(commerce, &placeholder, subscriber.email.as_deref()).await;
            assemble::fallback_record(&subscriber, enrichment)
        }
    }
}

/// Fetches the member profiles of the configured audience list. An absent
/// list yields an empty seed set; a failed fetch propagates (total failure).
async fn fetch_profiles(
    events: &EventsClient,
    list_name: &str,
) -> Result<Vec<Profile>, EventsError> {
    match events.resolve_list_id(list_name).await? {
        Some(list_id) => events.fetch_list_profiles(&list_id).await,
        None => {
            tracing::warn!(list = list_name, "audience list not found; no subscribers");
            Ok(Vec::new())
        }
    }
}

fn events_client(config: &AppConfig) -> Result<EventsClient, PipelineError> {
    let client = match config.events_base_url.as_deref() {
        Some(base) => EventsClient::with_base_url(
            &config.events_api_key,
            config.request_timeout_secs,
            config.max_retries,
            config.retry_backoff_base_ms,
            base,
        )?,
        None => EventsClient::new(
            &config.events_api_key,
            config.request_timeout_secs,
            config.max_retries,
            config.retry_backoff_base_ms,
        )?,
    };
    Ok(client)
}

/// Builds the commerce client when credentials are configured. Missing
/// credentials are not an error: enrichment short-circuits to unknown.
fn commerce_client(config: &AppConfig) -> Result<Option<CommerceClient>, PipelineError> {
    let Some(token) = config.commerce_token.as_deref() else {
        return Ok(None);
    };
    if let Some(base) = config.commerce_base_url.as_deref() {
        return Ok(Some(CommerceClient::with_base_url(
            token,
            config.request_timeout_secs,
            base,
        )?));
    }
    let Some(domain) = config.commerce_domain.as_deref() else {
        return Ok(None);
    };
    Ok(Some(CommerceClient::new(
        domain,
        token,
        config.request_timeout_secs,
    )?))
}
