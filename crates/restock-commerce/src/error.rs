use thiserror::Error;

/// Errors returned by the commerce API client.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The commerce API answered with a non-success HTTP status.
    #[error("commerce API returned status {status} for {context}")]
    Status { status: u16, context: String },

    /// The response body could not be deserialized into the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
