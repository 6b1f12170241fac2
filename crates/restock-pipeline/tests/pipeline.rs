//! End-to-end reconciliation tests against wiremock stand-ins for both the
//! event/profile store and the commerce system.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use restock_core::{AppConfig, Environment};
use restock_pipeline::{run_reconciliation, PipelineError};

fn test_config(events_base: &str, commerce_base: Option<&str>) -> AppConfig {
    AppConfig {
        env: Environment::Test,
        bind_addr: "127.0.0.1:0".parse().expect("valid socket addr"),
        log_level: "info".to_string(),
        events_api_key: "pk_test".to_string(),
        events_base_url: Some(events_base.to_string()),
        commerce_domain: None,
        commerce_token: commerce_base.map(|_| "shpat_test".to_string()),
        commerce_base_url: commerce_base.map(str::to_string),
        list_name: "Back in Stock".to_string(),
        signup_metric: "Back in Stock Signup".to_string(),
        alert_metric: "Back in Stock Alert".to_string(),
        message_metric: "Received Email".to_string(),
        request_timeout_secs: 5,
        max_retries: 0,
        retry_backoff_base_ms: 1,
    }
}

fn page(data: serde_json::Value) -> serde_json::Value {
    json!({ "data": data, "links": { "next": null } })
}

fn signup_event(id: &str, profile: &str, product: &str, datetime: &str) -> serde_json::Value {
    json!({
        "type": "event",
        "id": id,
        "attributes": {
            "datetime": datetime,
            "event_properties": { "ProductID": product, "ProductTitle": "Widget" }
        },
        "relationships": { "profile": { "data": { "type": "profile", "id": profile } } }
    })
}

/// Mounts the standard event-store fixture: one audience list with profiles
/// `p1` (two signups) and `p2` (no signups), the three metrics, one explicit
/// alert for product 42 between the two signups, and one non-restock message.
async fn mount_event_store(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/lists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page(json!([
            { "type": "list", "id": "L1", "attributes": { "name": "Back in Stock" } }
        ]))))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/lists/L1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page(json!([
            {
                "type": "profile",
                "id": "p1",
                "attributes": {
                    "email": "a@example.com",
                    "first_name": "Ada",
                    "last_name": "Lovelace",
                    "created": "2024-01-01T00:00:00+00:00"
                }
            },
            {
                "type": "profile",
                "id": "p2",
                "attributes": {
                    "email": "b@example.com",
                    "first_name": null,
                    "last_name": null,
                    "created": "2024-02-01T00:00:00+00:00"
                }
            }
        ]))))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page(json!([
            { "type": "metric", "id": "M-SIGNUP", "attributes": { "name": "Back in Stock Signup" } },
            { "type": "metric", "id": "M-ALERT", "attributes": { "name": "Back in Stock Alert" } },
            { "type": "metric", "id": "M-MSG", "attributes": { "name": "Received Email" } }
        ]))))
        .mount(server)
        .await;

    // Store-native descending recency: product 77 signup first.
    Mock::given(method("GET"))
        .and(path("/api/events"))
        .and(query_param("filter", "equals(metric_id,\"M-SIGNUP\")"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page(json!([
            signup_event("e2", "p1", "77", "2024-05-03T00:00:00+00:00"),
            signup_event("e1", "p1", "42", "2024-05-01T00:00:00+00:00"),
        ]))))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/events"))
        .and(query_param("filter", "equals(metric_id,\"M-ALERT\")"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page(json!([
            {
                "type": "event",
                "id": "a1",
                "attributes": {
                    "datetime": "2024-05-02T00:00:00+00:00",
                    "event_properties": { "ProductID": "42" }
                },
                "relationships": { "profile": { "data": { "type": "profile", "id": "p1" } } }
            }
        ]))))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/events"))
        .and(query_param("filter", "equals(metric_id,\"M-MSG\")"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page(json!([
            {
                "type": "event",
                "id": "m1",
                "attributes": {
                    "datetime": "2024-05-05T00:00:00+00:00",
                    "event_properties": { "Subject": "Your receipt", "Preview": "Thanks!" }
                },
                "relationships": { "profile": { "data": { "type": "profile", "id": "p1" } } }
            }
        ]))))
        .mount(server)
        .await;
}

async fn mount_commerce(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/admin/api/2024-10/products/42/variants.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "variants": [{ "id": 1, "sku": "A-1", "inventory_quantity": 3 }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/admin/api/2024-10/products/77/variants.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "variants": [{ "id": 9, "sku": "B-1", "inventory_quantity": 0 }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/admin/api/2024-10/customers/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "customers": [{ "id": 501, "email": "a@example.com" }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/admin/api/2024-10/orders.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "orders": [{
                "id": 9001,
                "created_at": "2024-05-04T00:00:00+00:00",
                "line_items": [{ "product_id": 42, "variant_id": 1 }]
            }]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn full_run_correlates_enriches_and_orders() {
    let events = MockServer::start().await;
    let commerce = MockServer::start().await;
    mount_event_store(&events).await;
    mount_commerce(&commerce).await;

    let config = test_config(&events.uri(), Some(&commerce.uri()));
    let records = run_reconciliation(&config).await.unwrap();

    assert_eq!(records.len(), 3, "two signups for p1 + one fallback for p2");

    // Ordering: product 77 signup (05-03), product 42 signup (05-01),
    // then the fallback record dated at p2's profile creation (02-01).
    assert_eq!(records[0].product_id.as_deref(), Some("77"));
    assert_eq!(records[1].product_id.as_deref(), Some("42"));
    assert_eq!(records[2].subscriber_id, "p2");

    // The explicit alert (05-02, product 42) lands after 42's signup but
    // before 77's signup: only the earlier signup resolves true.
    assert!(records[1].alert_sent, "product 42 signup was alerted");
    assert!(!records[0].alert_sent, "product 77 signup was not");

    // Enrichment for the product 42 signup.
    assert_eq!(records[1].current_inventory, Some(3));
    assert_eq!(records[1].sku.as_deref(), Some("A-1"));
    assert_eq!(records[1].commerce_customer_id.as_deref(), Some("501"));
    assert!(records[1].ordered, "order on 05-04 references product 42");
    assert!(!records[0].ordered, "no order references product 77");

    // Fallback record: null product fields, identity preserved.
    assert!(records[2].product_id.is_none());
    assert!(records[2].sku.is_none());
    assert!(!records[2].alert_sent);
    assert_eq!(records[2].id, "p2");
    assert_eq!(records[2].email.as_deref(), Some("b@example.com"));
}

#[tokio::test]
async fn profile_list_failure_aborts_the_run() {
    let events = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/lists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page(json!([
            { "type": "list", "id": "L1", "attributes": { "name": "Back in Stock" } }
        ]))))
        .mount(&events)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/lists/L1/profiles"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&events)
        .await;

    let config = test_config(&events.uri(), None);
    let result = run_reconciliation(&config).await;
    assert!(
        matches!(result, Err(PipelineError::ProfileFetch(_))),
        "profile fetch failure must abort the whole run, got: {result:?}"
    );
}

#[tokio::test]
async fn enrichment_failure_degrades_fields_but_keeps_records() {
    let events = MockServer::start().await;
    let commerce = MockServer::start().await;
    mount_event_store(&events).await;

    // Every commerce endpoint fails; records must survive with unknowns.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&commerce)
        .await;

    let config = test_config(&events.uri(), Some(&commerce.uri()));
    let records = run_reconciliation(&config).await.unwrap();

    assert_eq!(records.len(), 3, "no record is dropped on enrichment failure");
    assert!(records[1].alert_sent, "correlation is unaffected");
    assert_eq!(records[1].current_inventory, None);
    assert_eq!(records[1].sku, None);
    assert_eq!(records[1].commerce_customer_id, None);
    assert!(!records[1].ordered);
}

#[tokio::test]
async fn absent_signup_metric_yields_fallback_records_only() {
    // No signup metric registered at all: the engine must return an empty
    // signup index rather than an error, leaving only fallback records.
    let events = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/lists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page(json!([
            { "type": "list", "id": "L1", "attributes": { "name": "Back in Stock" } }
        ]))))
        .mount(&events)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/lists/L1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page(json!([
            {
                "type": "profile",
                "id": "p1",
                "attributes": { "email": "a@example.com", "created": "2024-01-01T00:00:00+00:00" }
            }
        ]))))
        .mount(&events)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page(json!([]))))
        .mount(&events)
        .await;

    let config = test_config(&events.uri(), None);
    let records = run_reconciliation(&config).await.unwrap();

    assert_eq!(records.len(), 1, "one fallback record per subscriber");
    assert_eq!(records[0].id, "p1");
    assert!(records[0].product_id.is_none());
    assert!(!records[0].alert_sent);
}
