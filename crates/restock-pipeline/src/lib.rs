//! The event correlation and enrichment pipeline.
//!
//! One invocation re-derives the full reconciled state from scratch:
//!
//! 1. the profile list, the signup index, and the alert index are fetched
//!    concurrently from the event store ([`correlate`]);
//! 2. per signup, alert delivery is resolved against the merged alert
//!    signals ([`correlate::resolve_alert_sent`]);
//! 3. per signup, live commerce facts are fetched concurrently and degrade
//!    field-by-field ([`enrich`]);
//! 4. results are joined into the final ordered record list ([`assemble`]).
//!
//! Only the profile-list fetch can abort a run; every other upstream failure
//! degrades to empty data or an unknown field.

mod assemble;
mod correlate;
mod enrich;
mod error;
mod run;

pub use assemble::{fallback_record, signup_record, sort_records};
pub use correlate::{build_alert_index, build_signup_index, resolve_alert_sent};
pub use enrich::enrich_signup;
pub use error::PipelineError;
pub use run::run_reconciliation;
