//! Enrichment fan-out: per-signup commerce lookups.
//!
//! Three independent lookups run concurrently for each resolved signup.
//! Every lookup degrades on its own: a failed or impossible lookup leaves its
//! field at the unknown/false value and never drops the record. Lookups that
//! lack required configuration (no commerce client) or input (no product id,
//! no email) short-circuit without network I/O.

use chrono::{DateTime, Utc};

use restock_commerce::{CommerceClient, Order, Variant};
use restock_core::{normalize_id, same_product, Enrichment, SignupEvent};

/// Runs the three commerce lookups for one signup concurrently and merges
/// their results into an [`Enrichment`].
pub async fn enrich_signup(
    commerce: Option<&CommerceClient>,
    signup: &SignupEvent,
    email: Option<&str>,
) -> Enrichment {
    let (inventory_sku, commerce_customer_id, ordered) = tokio::join!(
        fetch_inventory_and_sku(commerce, signup),
        resolve_commerce_customer_id(commerce, email),
        was_ordered_after(commerce, email, signup),
    );
    let (current_inventory, sku) = inventory_sku;

    Enrichment {
        current_inventory,
        sku,
        commerce_customer_id,
        ordered,
    }
}

/// Sums per-variant stock and picks the representative SKU.
///
/// SKU preference: the variant matching the signup's variant id, else the
/// product's first variant, else unknown.
async fn fetch_inventory_and_sku(
    commerce: Option<&CommerceClient>,
    signup: &SignupEvent,
) -> (Option<i64>, Option<String>) {
    let Some(client) = commerce else {
        return (None, None);
    };
    let Some(product_id) = normalize_id(signup.product_id.as_deref()) else {
        return (None, None);
    };

    match client.get_product_variants(&product_id).await {
        Ok(variants) => summarize_variants(&variants, signup.variant_id.as_deref()),
        Err(e) => {
            tracing::warn!(
                product_id,
                error = %e,
                "inventory lookup failed; leaving inventory/sku unknown"
            );
            (None, None)
        }
    }
}

/// Looks the subscriber up in the commerce system by email; first match wins.
/// Absence is not an error.
async fn resolve_commerce_customer_id(
    commerce: Option<&CommerceClient>,
    email: Option<&str>,
) -> Option<String> {
    let client = commerce?;
    let email = email?;

    match client.search_customers_by_email(email).await {
        Ok(customers) => customers.first().map(|c| c.id.to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "customer lookup failed; leaving customer id unknown");
            None
        }
    }
}

/// Returns `true` if an order created at or after the signup timestamp
/// references the signup's product in its line items.
async fn was_ordered_after(
    commerce: Option<&CommerceClient>,
    email: Option<&str>,
    signup: &SignupEvent,
) -> bool {
    let Some(client) = commerce else {
        return false;
    };
    let (Some(email), Some(product_id)) = (email, signup.product_id.as_deref()) else {
        return false;
    };

    match client.list_orders_by_email(email).await {
        Ok(orders) => ordered_after(&orders, product_id, signup.signup_at),
        Err(e) => {
            tracing::warn!(error = %e, "order lookup failed; reporting not ordered");
            false
        }
    }
}

/// Pure half of the inventory lookup: stock summing + SKU preference.
fn summarize_variants(
    variants: &[Variant],
    wanted_variant: Option<&str>,
) -> (Option<i64>, Option<String>) {
    if variants.is_empty() {
        return (Some(0), None);
    }

    let total: i64 = variants
        .iter()
        .filter_map(|v| v.inventory_quantity)
        .sum();

    let wanted = normalize_id(wanted_variant);
    let matching = wanted.as_deref().and_then(|w| {
        variants
            .iter()
            .find(|v| v.id.to_string() == w)
            .and_then(|v| v.sku.clone())
    });
    let sku = matching.or_else(|| variants.first().and_then(|v| v.sku.clone()));

    (Some(total), sku)
}

/// Pure half of the order lookup: keeps orders created at or after the signup
/// and checks their line items for the (normalized) product id.
fn ordered_after(orders: &[Order], product_id: &str, signup_at: Option<DateTime<Utc>>) -> bool {
    let cutoff = signup_at.unwrap_or(DateTime::UNIX_EPOCH);
    orders.iter().any(|order| {
        let created = order
            .created_at
            .as_deref()
            .and_then(restock_core::parse_timestamp);
        let Some(created) = created else {
            return false;
        };
        if created < cutoff {
            return false;
        }
        order.line_items.iter().any(|item| {
            item.product_id
                .map(|id| id.to_string())
                .is_some_and(|id| same_product(Some(&id), Some(product_id)))
        })
    })
}
