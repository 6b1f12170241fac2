//! Event store API response types.
//!
//! The store wraps every collection in a `{"data": [...], "links": {...}}`
//! envelope; [`Page`] captures that pattern generically. Event payloads carry
//! loosely-structured `event_properties`, kept as raw JSON here and
//! interpreted by the `parse` module.

use serde::Deserialize;

/// One page of a collection, with the cursor link to the next page.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub links: PageLinks,
}

/// Pagination links; `next` is an absolute URL or absent on the last page.
#[derive(Debug, Default, Deserialize)]
pub struct PageLinks {
    #[serde(default)]
    pub next: Option<String>,
}

/// A metric definition: opaque id plus human-readable display name.
#[derive(Debug, Clone, Deserialize)]
pub struct Metric {
    pub id: String,
    pub attributes: MetricAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricAttributes {
    pub name: String,
}

/// A raw event record for some metric.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub id: String,
    pub attributes: EventAttributes,
    #[serde(default)]
    pub relationships: Option<EventRelationships>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventAttributes {
    /// The event's own record timestamp (ISO 8601).
    #[serde(default)]
    pub datetime: Option<String>,
    /// Loosely-structured per-event payload; key names vary by producer.
    #[serde(default)]
    pub event_properties: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventRelationships {
    #[serde(default)]
    pub profile: Option<Relationship>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub data: Option<RelationshipRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelationshipRef {
    pub id: String,
}

impl Event {
    /// The subscriber this event belongs to, if the store attributed one.
    #[must_use]
    pub fn profile_id(&self) -> Option<&str> {
        self.relationships
            .as_ref()?
            .profile
            .as_ref()?
            .data
            .as_ref()
            .map(|r| r.id.as_str())
    }
}

/// An audience list definition.
#[derive(Debug, Clone, Deserialize)]
pub struct List {
    pub id: String,
    pub attributes: ListAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListAttributes {
    pub name: String,
}

/// A subscriber profile as returned by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub id: String,
    pub attributes: ProfileAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileAttributes {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Profile-creation timestamp (ISO 8601).
    #[serde(default)]
    pub created: Option<String>,
}
