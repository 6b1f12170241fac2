use thiserror::Error;

/// Errors returned by the event store client.
#[derive(Debug, Error)]
pub enum EventsError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success HTTP status.
    #[error("event store returned status {status} for {context}")]
    Status { status: u16, context: String },

    /// The response body could not be deserialized into the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl EventsError {
    /// `true` when the error is a non-success response status (as opposed to
    /// a transport-level failure). Event fetches degrade these to an empty
    /// sequence rather than propagating.
    #[must_use]
    pub fn is_status(&self) -> bool {
        matches!(self, EventsError::Status { .. })
    }
}
