//! Reconciliation assembler: joins correlation and enrichment output into the
//! final ordered record list.

use chrono::{DateTime, Utc};

use restock_core::{EnrichedSignupRecord, Enrichment, SignupEvent, SubscriberProfile};

/// Builds the output record for one (subscriber, signup) pair.
#[must_use]
pub fn signup_record(
    profile: &SubscriberProfile,
    signup: &SignupEvent,
    alert_sent: bool,
    enrichment: Enrichment,
) -> EnrichedSignupRecord {
    EnrichedSignupRecord {
        id: composite_id(
            &profile.id,
            signup.product_id.as_deref(),
            signup.signup_at,
        ),
        subscriber_id: profile.id.clone(),
        email: profile.email.clone(),
        name: profile.display_name(),
        product_id: signup.product_id.clone(),
        variant_id: signup.variant_id.clone(),
        product_title: signup.product_title.clone(),
        product_url: signup.product_url.clone(),
        signup_date: signup.signup_at,
        alert_sent,
        ordered: enrichment.ordered,
        current_inventory: enrichment.current_inventory,
        sku: enrichment.sku,
        commerce_customer_id: enrichment.commerce_customer_id,
    }
}

/// Builds the single fallback record for a subscriber with zero signup events:
/// null product fields, `alert_sent` never evaluated (false), and the
/// profile-creation timestamp standing in for the signup timestamp.
#[must_use]
pub fn fallback_record(profile: &SubscriberProfile, enrichment: Enrichment) -> EnrichedSignupRecord {
    EnrichedSignupRecord {
        id: profile.id.clone(),
        subscriber_id: profile.id.clone(),
        email: profile.email.clone(),
        name: profile.display_name(),
        product_id: None,
        variant_id: None,
        product_title: None,
        product_url: None,
        signup_date: profile.created_at,
        alert_sent: false,
        ordered: false,
        current_inventory: enrichment.current_inventory,
        sku: enrichment.sku,
        commerce_customer_id: enrichment.commerce_customer_id,
    }
}

/// Sorts records by signup timestamp descending. Records with an absent or
/// unparseable timestamp carry the epoch sort key and land last.
pub fn sort_records(records: &mut [EnrichedSignupRecord]) {
    records.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
}

/// Synthetic composite identifier: subscriber id + product id + signup
/// timestamp, concatenated. Distinguishes multiple signups by one subscriber.
fn composite_id(
    subscriber_id: &str,
    product_id: Option<&str>,
    signup_at: Option<DateTime<Utc>>,
) -> String {
    let product = product_id.unwrap_or_default();
    let timestamp = signup_at.map(|dt| dt.to_rfc3339()).unwrap_or_default();
    format!("{subscriber_id}{product}{timestamp}")
}

#[cfg(test)]
mod tests {
    use restock_core::parse_timestamp;

    use super::*;

    fn profile() -> SubscriberProfile {
        SubscriberProfile {
            id: "p1".to_string(),
            email: Some("a@example.com".to_string()),
            first_name: Some("Ada".to_string()),
            last_name: None,
            created_at: parse_timestamp("2024-01-01T00:00:00+00:00"),
        }
    }

    fn signup(product_id: &str, at: Option<&str>) -> SignupEvent {
        SignupEvent {
            subscriber_id: "p1".to_string(),
            product_id: Some(product_id.to_string()),
            variant_id: None,
            product_title: Some("Widget".to_string()),
            product_url: None,
            signup_at: at.and_then(parse_timestamp),
        }
    }

    #[test]
    fn signup_record_carries_composite_id() {
        let record = signup_record(
            &profile(),
            &signup("42", Some("2024-05-01T00:00:00+00:00")),
            true,
            Enrichment::default(),
        );
        assert_eq!(record.id, "p1422024-05-01T00:00:00+00:00");
        assert_eq!(record.subscriber_id, "p1");
        assert!(record.alert_sent);
        assert_eq!(record.product_title.as_deref(), Some("Widget"));
    }

    #[test]
    fn fallback_record_uses_bare_subscriber_id_and_profile_creation_date() {
        let record = fallback_record(&profile(), Enrichment::default());
        assert_eq!(record.id, "p1");
        assert!(record.product_id.is_none());
        assert!(record.product_title.is_none());
        assert!(!record.alert_sent);
        assert!(!record.ordered);
        assert_eq!(record.signup_date, parse_timestamp("2024-01-01T00:00:00+00:00"));
    }

    #[test]
    fn sort_records_descending_with_missing_timestamps_last() {
        let p = profile();
        let mut records = vec![
            signup_record(&p, &signup("a", None), false, Enrichment::default()),
            signup_record(
                &p,
                &signup("b", Some("2024-05-01T00:00:00+00:00")),
                false,
                Enrichment::default(),
            ),
            signup_record(
                &p,
                &signup("c", Some("2024-06-01T00:00:00+00:00")),
                false,
                Enrichment::default(),
            ),
        ];
        sort_records(&mut records);
        assert_eq!(records[0].product_id.as_deref(), Some("c"));
        assert_eq!(records[1].product_id.as_deref(), Some("b"));
        assert_eq!(
            records[2].product_id.as_deref(),
            Some("a"),
            "absent timestamp sorts last"
        );
    }
}
