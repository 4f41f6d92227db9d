//! Endpoint URL construction for provider backends.

/// Join a provider base URL and an endpoint path with exactly one slash.
///
/// ```
/// use nexus::utils::url::endpoint_url;
///
/// assert_eq!(
///     endpoint_url("https://api.anthropic.com/v1/", "/messages"),
///     "https://api.anthropic.com/v1/messages"
/// );
/// ```
pub fn endpoint_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}
