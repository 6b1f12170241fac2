//! HTTP client for the commerce admin REST API.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::CommerceError;
use crate::types::{Customer, CustomersResponse, Order, OrdersResponse, Variant, VariantsResponse};

const API_VERSION: &str = "2024-10";

/// Client for the commerce system's admin API.
///
/// Constructed from the shop domain and an access token. Use
/// [`CommerceClient::with_base_url`] to point at a mock server in tests.
pub struct CommerceClient {
    client: Client,
    token: String,
    base_url: Url,
}

impl CommerceClient {
    /// Creates a client for the shop at `domain` (e.g. `example.myshopify.com`).
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`CommerceError::Status`] if the domain does
    /// not form a valid URL.
    pub fn new(domain: &str, token: &str, timeout_secs: u64) -> Result<Self, CommerceError> {
        Self::with_base_url(token, timeout_secs, &format!("https://{domain}/"))
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`CommerceError::Status`] if `base_url` is
    /// not a valid URL.
    pub fn with_base_url(
        token: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, CommerceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("restock/0.1 (signup-reconciliation)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| CommerceError::Status {
            status: 0,
            context: format!("invalid base URL '{base_url}': {e}"),
        })?;

        Ok(Self {
            client,
            token: token.to_owned(),
            base_url,
        })
    }

    /// Fetches all variants of a product, with per-variant stock and SKU.
    ///
    /// # Errors
    ///
    /// - [`CommerceError::Http`] on network failure.
    /// - [`CommerceError::Status`] on a non-success response.
    /// - [`CommerceError::Deserialize`] if the body is not the expected shape.
    pub async fn get_product_variants(
        &self,
        product_id: &str,
    ) -> Result<Vec<Variant>, CommerceError> {
        let url = self.endpoint(&format!("products/{product_id}/variants.json"), &[])?;
        let response: VariantsResponse = self
            .request_json(&url, &format!("getProductVariants({product_id})"))
            .await?;
        Ok(response.variants)
    }

    /// Searches customers by email. The commerce search is fuzzy; callers take
    /// the first match.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`CommerceClient::get_product_variants`].
    pub async fn search_customers_by_email(
        &self,
        email: &str,
    ) -> Result<Vec<Customer>, CommerceError> {
        let url = self.endpoint(
            "customers/search.json",
            &[("query", &format!("email:{email}"))],
        )?;
        let response: CustomersResponse = self
            .request_json(&url, "searchCustomersByEmail")
            .await?;
        Ok(response.customers)
    }

    /// Lists a customer's orders (any status) with line items.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`CommerceClient::get_product_variants`].
    pub async fn list_orders_by_email(&self, email: &str) -> Result<Vec<Order>, CommerceError> {
        let url = self.endpoint("orders.json", &[("email", email), ("status", "any")])?;
        let response: OrdersResponse = self.request_json(&url, "listOrdersByEmail").await?;
        Ok(response.orders)
    }

    /// Builds `{base}/admin/api/{version}/{path}` with encoded query params.
    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, CommerceError> {
        let mut url = self
            .base_url
            .join(&format!("admin/api/{API_VERSION}/{path}"))
            .map_err(|e| CommerceError::Status {
                status: 0,
                context: format!("invalid endpoint path '{path}': {e}"),
            })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Sends a GET with the access-token header, asserts a 2xx status, and
    /// parses the body.
    async fn request_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, CommerceError> {
        tracing::debug!(%url, context, "commerce GET");
        let response = self
            .client
            .get(url.clone())
            .header("X-Shopify-Access-Token", &self.token)
            .header("accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CommerceError::Status {
                status: status.as_u16(),
                context: context.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| CommerceError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> CommerceClient {
        CommerceClient::with_base_url("test-token", 30, base_url)
            .expect("client construction should not fail")
    }

    #[test]
    fn endpoint_builds_versioned_admin_path() {
        let client = test_client("https://example.myshopify.com");
        let url = client.endpoint("products/42/variants.json", &[]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.myshopify.com/admin/api/2024-10/products/42/variants.json"
        );
    }

    #[test]
    fn endpoint_encodes_query_params() {
        let client = test_client("https://example.myshopify.com");
        let url = client
            .endpoint("customers/search.json", &[("query", "email:a+b@example.com")])
            .unwrap();
        assert!(
            url.as_str().contains("query=email%3Aa%2Bb%40example.com"),
            "query param should be percent-encoded: {url}"
        );
    }

    #[test]
    fn new_derives_base_url_from_domain() {
        let client = CommerceClient::new("example.myshopify.com", "t", 5).unwrap();
        let url = client.endpoint("orders.json", &[]).unwrap();
        assert!(url.as_str().starts_with("https://example.myshopify.com/"));
    }
}
