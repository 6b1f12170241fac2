//! HTTP client for the event/profile store REST API.
//!
//! Wraps `reqwest` with store-specific auth headers, cursor pagination, and
//! per-page retry. Use [`EventsClient::new`] for production or
//! [`EventsClient::with_base_url`] to point at a mock server in tests.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::EventsError;
use crate::retry::retry_with_backoff;
use crate::types::{Event, List, Metric, Page, Profile};

const DEFAULT_BASE_URL: &str = "https://a.klaviyo.com/";
const API_REVISION: &str = "2024-10-15";

/// Hard cap on pages followed per collection, in case the store ever returns
/// a cyclic `links.next`.
const MAX_PAGES: usize = 100;

/// Client for the event/profile store.
pub struct EventsClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl EventsClient {
    /// Creates a new client pointed at the production store.
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, EventsError> {
        Self::with_base_url(api_key, timeout_secs, max_retries, backoff_base_ms, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`EventsError::Status`] if `base_url` is not
    /// a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
        base_url: &str,
    ) -> Result<Self, EventsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("restock/0.1 (signup-reconciliation)")
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // Url::join resolves endpoint paths under it rather than replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| EventsError::Status {
            status: 0,
            context: format!("invalid base URL '{base_url}': {e}"),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Resolves a metric display name to its opaque store id.
    ///
    /// Case-insensitive exact match. `Ok(None)` when no metric carries that
    /// name; a valid "no data yet" state, not a failure.
    ///
    /// # Errors
    ///
    /// Propagates [`EventsError`] from the metric listing.
    pub async fn resolve_metric_id(&self, name: &str) -> Result<Option<String>, EventsError> {
        let metrics = self.list_metrics().await?;
        let wanted = name.to_lowercase();
        Ok(metrics
            .into_iter()
            .find(|m| m.attributes.name.to_lowercase() == wanted)
            .map(|m| m.id))
    }

    /// Lists all metric definitions, following pagination.
    ///
    /// # Errors
    ///
    /// - [`EventsError::Http`] on transport failure.
    /// - [`EventsError::Status`] on a non-success response.
    /// - [`EventsError::Deserialize`] if a page does not match the expected shape.
    pub async fn list_metrics(&self) -> Result<Vec<Metric>, EventsError> {
        let url = self.endpoint("api/metrics")?;
        self.fetch_paged(url, "listMetrics").await
    }

    /// Pages all events for a metric, optionally filtered to one subscriber.
    ///
    /// Events come back in the store's native descending-recency order, which
    /// is preserved across pages. A non-success response degrades to whatever
    /// was collected so far (empty on the first page) with a warning, so one
    /// unavailable data source never aborts the whole pipeline.
    ///
    /// # Errors
    ///
    /// - [`EventsError::Http`] on transport-level failure.
    /// - [`EventsError::Deserialize`] if a page body is not the expected shape.
    pub async fn fetch_events(
        &self,
        metric_id: &str,
        profile_filter: Option<&str>,
    ) -> Result<Vec<Event>, EventsError> {
        let mut url = self.endpoint("api/events")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("filter", &event_filter(metric_id, profile_filter));
            pairs.append_pair("sort", "-datetime");
        }

        let mut events: Vec<Event> = Vec::new();
        let mut next = Some(url);
        let mut pages = 0usize;

        while let Some(page_url) = next.take() {
            if pages >= MAX_PAGES {
                tracing::warn!(metric_id, pages, "event pagination cap reached; truncating");
                break;
            }
            pages += 1;

            let page: Page<Event> = match self.get_page(&page_url, "fetchEvents").await {
                Ok(page) => page,
                Err(err) if err.is_status() => {
                    tracing::warn!(
                        metric_id,
                        error = %err,
                        collected = events.len(),
                        "event fetch returned non-success status; degrading to collected events"
                    );
                    break;
                }
                Err(err) => return Err(err),
            };

            events.extend(page.data);
            next = page
                .links
                .next
                .as_deref()
                .and_then(|raw| Url::parse(raw).ok());
        }

        Ok(events)
    }

    /// Resolves an audience list display name to its opaque store id.
    ///
    /// Case-insensitive exact match; `Ok(None)` when absent.
    ///
    /// # Errors
    ///
    /// Propagates [`EventsError`] from the list listing.
    pub async fn resolve_list_id(&self, name: &str) -> Result<Option<String>, EventsError> {
        let url = self.endpoint("api/lists")?;
        let lists: Vec<List> = self.fetch_paged(url, "listLists").await?;
        let wanted = name.to_lowercase();
        Ok(lists
            .into_iter()
            .find(|l| l.attributes.name.to_lowercase() == wanted)
            .map(|l| l.id))
    }

    /// Pages all member profiles of an audience list.
    ///
    /// Unlike [`EventsClient::fetch_events`], every failure propagates: the
    /// profile list is the seed set of the run, so there is nothing sensible
    /// to degrade to.
    ///
    /// # Errors
    ///
    /// - [`EventsError::Http`] on transport failure.
    /// - [`EventsError::Status`] on a non-success response.
    /// - [`EventsError::Deserialize`] if a page does not match the expected shape.
    pub async fn fetch_list_profiles(&self, list_id: &str) -> Result<Vec<Profile>, EventsError> {
        let url = self.endpoint(&format!("api/lists/{list_id}/profiles"))?;
        self.fetch_paged(url, "fetchListProfiles").await
    }

    /// Follows `links.next` cursors, concatenating `data` across pages.
    async fn fetch_paged<T: DeserializeOwned>(
        &self,
        first: Url,
        context: &str,
    ) -> Result<Vec<T>, EventsError> {
        let mut items: Vec<T> = Vec::new();
        let mut next = Some(first);
        let mut pages = 0usize;

        while let Some(page_url) = next.take() {
            if pages >= MAX_PAGES {
                tracing::warn!(context, pages, "pagination cap reached; truncating");
                break;
            }
            pages += 1;

            let page: Page<T> = self.get_page(&page_url, context).await?;
            items.extend(page.data);
            next = page
                .links
                .next
                .as_deref()
                .and_then(|raw| Url::parse(raw).ok());
        }

        Ok(items)
    }

    /// Fetches a single page with retry on transient failures.
    async fn get_page<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<Page<T>, EventsError> {
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.request_json(url, context)
        })
        .await?;
        serde_json::from_value(body).map_err(|e| EventsError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }

    /// Sends one GET request with auth headers, checking the response status.
    async fn request_json(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<serde_json::Value, EventsError> {
        let response = self
            .client
            .get(url.clone())
            .header("Authorization", format!("Klaviyo-API-Key {}", self.api_key))
            .header("revision", API_REVISION)
            .header("accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EventsError::Status {
                status: status.as_u16(),
                context: context.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| EventsError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, EventsError> {
        self.base_url.join(path).map_err(|e| EventsError::Status {
            status: 0,
            context: format!("invalid endpoint path '{path}': {e}"),
        })
    }
}

/// Builds the store's filter expression for an event query.
fn event_filter(metric_id: &str, profile_filter: Option<&str>) -> String {
    match profile_filter {
        Some(profile_id) => format!(
            "and(equals(metric_id,\"{metric_id}\"),equals(profile_id,\"{profile_id}\"))"
        ),
        None => format!("equals(metric_id,\"{metric_id}\")"),
    }
}
