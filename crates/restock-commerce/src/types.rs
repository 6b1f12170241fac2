//! Commerce admin API response types.

use serde::Deserialize;

/// One page of product variants: `{ "variants": [...] }`.
#[derive(Debug, Deserialize)]
pub struct VariantsResponse {
    #[serde(default)]
    pub variants: Vec<Variant>,
}

/// A product variant with its live stock level.
#[derive(Debug, Clone, Deserialize)]
pub struct Variant {
    pub id: i64,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub inventory_quantity: Option<i64>,
}

/// Customer search response: `{ "customers": [...] }`.
#[derive(Debug, Deserialize)]
pub struct CustomersResponse {
    #[serde(default)]
    pub customers: Vec<Customer>,
}

/// A commerce-system customer record.
#[derive(Debug, Clone, Deserialize)]
pub struct Customer {
    pub id: i64,
    #[serde(default)]
    pub email: Option<String>,
}

/// Order search response: `{ "orders": [...] }`.
#[derive(Debug, Deserialize)]
pub struct OrdersResponse {
    #[serde(default)]
    pub orders: Vec<Order>,
}

/// An order with its line items; `created_at` is ISO 8601.
#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    pub id: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

/// One line of an order, referencing the purchased product.
#[derive(Debug, Clone, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub variant_id: Option<i64>,
}
