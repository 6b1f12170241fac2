//! Heuristic classifier for generic "message received" events.
//!
//! The event store only attributes a dedicated alert metric when the webhook
//! path fired; notifications sent through the downstream automation flow show
//! up as generic received-message events. This classifier recovers those by
//! keyword matching on subject and preview text.
//!
//! Known limitation: a marketing email whose subject happens to contain
//! "now available" is counted as a restock notification.

use crate::normalize::normalize_quotes;

/// Phrases that mark a message subject as a restock notification.
const SUBJECT_PHRASES: &[&str] = &[
    "back in stock",
    "it's here",
    "ready to order",
    "now available",
    "in stock",
    "restock",
    "pre-order",
    "preorder",
];

/// Narrower phrase set applied to the preview text.
const PREVIEW_PHRASES: &[&str] = &["back in stock", "now available", "in stock", "restock"];

/// Decides whether a received message looks like a restock notification.
///
/// Both inputs are lowercased and quote-normalized before substring matching,
/// so `it\u{2019}s here` and `it's here` classify identically. Pure function,
/// no I/O.
#[must_use]
pub fn is_restock_message(subject: &str, preview: &str) -> bool {
    let subject = normalize_quotes(subject).to_lowercase();
    let preview = normalize_quotes(preview).to_lowercase();

    SUBJECT_PHRASES.iter().any(|p| subject.contains(p))
        || PREVIEW_PHRASES.iter().any(|p| preview.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_phrases_match() {
        assert!(is_restock_message("Back in Stock: Widget", ""));
        assert!(is_restock_message("Ready to order now", ""));
        assert!(is_restock_message("Pre-Order opens today", ""));
        assert!(is_restock_message("Widget restocked", ""));
    }

    #[test]
    fn preview_phrases_match() {
        assert!(is_restock_message("Hello", "Your widget is back in stock"));
        assert!(is_restock_message("Hello", "Now available in all sizes"));
    }

    #[test]
    fn preview_set_is_narrower_than_subject_set() {
        // "ready to order" is a subject-only phrase.
        assert!(!is_restock_message("Hello", "ready to order"));
        assert!(is_restock_message("ready to order", ""));
    }

    #[test]
    fn curly_and_straight_quotes_classify_identically() {
        assert!(is_restock_message("It\u{2019}s here!", ""));
        assert!(is_restock_message("It's here!", ""));
    }

    #[test]
    fn case_is_ignored() {
        assert!(is_restock_message("NOW AVAILABLE", ""));
    }

    #[test]
    fn unrelated_message_does_not_match() {
        assert!(!is_restock_message("Your receipt", "Thanks for your purchase"));
    }
}
