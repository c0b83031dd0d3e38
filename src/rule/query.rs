use crate::types::RouteParams;

/// `key=value&...` with both sides percent-encoded, in key order.
pub fn build_query(params: &RouteParams) -> String {
    let mut query = String::new();
    for (key, value) in params {
        if !query.is_empty() {
            query.push('&');
        }
        query.push_str(&urlencoding::encode(key));
        query.push('=');
        query.push_str(&urlencoding::encode(value));
    }
    query
}
