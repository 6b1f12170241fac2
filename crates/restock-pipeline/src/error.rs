use thiserror::Error;

use restock_commerce::CommerceError;
use restock_events::EventsError;

/// Errors surfaced by a pipeline run.
///
/// Per the degrade-gracefully policy, most upstream failures never reach this
/// type: they are recovered locally as empty indexes or unknown fields. Only
/// client construction and the profile-list fetch escalate.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Event store client failure (construction or transport).
    #[error("event store error: {0}")]
    Events(#[from] EventsError),

    /// Commerce client construction failure.
    #[error("commerce client error: {0}")]
    Commerce(#[from] CommerceError),

    /// The top-level profile-list fetch failed; the run has no seed set and
    /// aborts as a total failure.
    #[error("profile list fetch failed: {0}")]
    ProfileFetch(#[source] EventsError),
}
