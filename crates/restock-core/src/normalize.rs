//! Canonicalization of product identifiers and quote glyphs.
//!
//! The event store and the commerce system disagree about identifier formats:
//! one side emits namespaced global IDs (`gid://shopify/Product/123`), the
//! other bare numeric strings (`123`). All product equality checks in the
//! pipeline go through [`normalize_id`] so the two forms compare equal.

/// Canonicalizes a product or variant identifier.
///
/// A namespaced global identifier (`scheme://namespace/type/123`) is reduced
/// to the segment after the last `/`. Anything else, including plain numeric
/// strings, is returned unchanged. Comparison is string equality of the
/// canonical forms; no numeric coercion is attempted.
#[must_use]
pub fn normalize_id(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    if raw.contains("://") {
        if let Some((_, suffix)) = raw.rsplit_once('/') {
            if !suffix.is_empty() {
                return Some(suffix.to_string());
            }
        }
    }
    Some(raw.to_string())
}

/// Returns `true` when two identifiers name the same product.
///
/// Both sides are canonicalized first; two absent identifiers are NOT
/// considered equal (an absent id carries no product attribution).
#[must_use]
pub fn same_product(a: Option<&str>, b: Option<&str>) -> bool {
    match (normalize_id(a), normalize_id(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Replaces Unicode curly/low quote glyphs with their ASCII equivalents.
///
/// Message subjects arrive with typographic quotes depending on which editor
/// composed the template; the classifier phrase set uses straight quotes, so
/// both inputs are normalized before matching.
#[must_use]
pub fn normalize_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => '"',
            other => other,
        })
        .collect()
}
