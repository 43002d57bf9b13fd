use serde_json::Value;

/* Tenants disagree on where the token lives */
const TOKEN_PATHS: [&str; 3] = ["/access_token", "/data/access_token", "/data/accessToken"];

/// Pull the bearer token out of a `/account/v1.0/token` response, trying every
/// known location in order. Empty strings do not count.
pub fn extract(value: &Value) -> Option<String> {
    TOKEN_PATHS
        .iter()
        .filter_map(|path| value.pointer(path))
        .filter_map(Value::as_str)
        .find(|token| !token.is_empty())
        .map(String::from)
}
