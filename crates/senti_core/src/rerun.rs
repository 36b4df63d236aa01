/// Query parameter that carries a product to analyse again.
pub const RERUN_PARAM: &str = "product";

/// Extract the URL-decoded `product` parameter from a location query string.
///
/// Accepts the query with or without its leading `?`. Blank values count as
/// absent.
pub fn rerun_product_from_query(query: &str) -> Option<String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == RERUN_PARAM)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
