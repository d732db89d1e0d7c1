//! HTTP transport for the crawl engine
//!
//! Builds the shared HTTP client. Redirects are never followed by the
//! client itself: the fetcher drives redirect following so that every hop
//! is observed and recorded.

use reqwest::{redirect::Policy, Client};
use std::collections::HashMap;
use std::time::Duration;

/// Builds the HTTP client used for the whole run.
///
/// One fixed timeout applies to every request; a timed-out call surfaces as
/// a network error on the page record and is never retried within a run.
pub fn build_http_client(user_agent: &str, timeout_secs: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs))
        .redirect(Policy::none()) // Handle redirects manually
        .gzip(true)
        .brotli(true)
        .build()
}

/// Copies response headers into a map with lowercased names, so later
/// lookups are case-insensitive.
pub fn header_map(response: &reqwest::Response) -> HashMap<String, String> {
    response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_lowercase(), v.to_string()))
        })
        .collect()
}
