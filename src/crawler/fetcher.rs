//! Redirect-following fetcher
//!
//! Fetches one URL, following 3xx responses in an explicit bounded loop.
//! Each hop appends the pre-redirect URL to the chain; the ceiling aborts
//! the attempt with `MaxRedirectsExceeded`. No loop detection happens here:
//! the fetcher records facts, and the rule engine inspects the completed
//! chain for repeats downstream.

use crate::crawler::transport::header_map;
use crate::record::FetchError;
use reqwest::Client;
use std::collections::HashMap;
use url::Url;

/// Terminal result of one fetch attempt, redirects already followed.
#[derive(Debug)]
pub enum FetchOutcome {
    /// A terminal response was received (any status, including 4xx/5xx and
    /// a 3xx that carried no Location header).
    Response {
        final_url: String,
        status: u16,
        headers: HashMap<String, String>,
        /// Body text, read only for `text/html` responses.
        body: Option<String>,
        redirect_chain: Vec<String>,
    },

    /// The attempt failed; the chain holds the hops taken before failure.
    Failed {
        error: FetchError,
        final_url: String,
        redirect_chain: Vec<String>,
    },
}

/// Fetches `url`, following up to `max_redirects` redirect hops.
pub async fn fetch_with_redirects(client: &Client, url: &str, max_redirects: u32) -> FetchOutcome {
    let mut chain: Vec<String> = Vec::new();
    let mut current = url.to_string();

    loop {
        let response = match client.get(&current).send().await {
            Ok(response) => response,
            Err(e) => {
                return FetchOutcome::Failed {
                    error: classify_request_error(&e),
                    final_url: current,
                    redirect_chain: chain,
                };
            }
        };

        let status = response.status().as_u16();

        if (300..400).contains(&status) {
            let location = response
                .headers()
                .get("location")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            if let Some(location) = location {
                let resolved = Url::parse(&current)
                    .ok()
                    .and_then(|base| base.join(&location).ok());

                if let Some(next) = resolved {
                    if chain.len() as u32 >= max_redirects {
                        tracing::debug!("Redirect ceiling hit following {}", url);
                        return FetchOutcome::Failed {
                            error: FetchError::MaxRedirectsExceeded,
                            final_url: current,
                            redirect_chain: chain,
                        };
                    }
                    chain.push(current);
                    current = next.to_string();
                    continue;
                }
                // Unresolvable Location falls through: the 3xx is terminal.
            }
            // A redirect without Location is returned as-is, non-retried.
        }

        let headers = header_map(&response);
        let is_html = headers
            .get("content-type")
            .map(|ct| ct.contains("text/html"))
            .unwrap_or(false);

        let body = if is_html {
            match response.text().await {
                Ok(text) => Some(text),
                Err(e) => {
                    tracing::warn!("Failed to read body of {}: {}", current, e);
                    return FetchOutcome::Failed {
                        error: FetchError::UnknownFetchFailure,
                        final_url: current,
                        redirect_chain: chain,
                    };
                }
            }
        } else {
            None
        };

        return FetchOutcome::Response {
            final_url: current,
            status,
            headers,
            body,
            redirect_chain: chain,
        };
    }
}

/// Maps transport errors onto the fetch-error taxonomy: timeouts and
/// connection failures are network errors, everything else the client
/// reports is an exception during fetch.
fn classify_request_error(e: &reqwest::Error) -> FetchError {
    if e.is_timeout() || e.is_connect() {
        FetchError::NetworkError
    } else {
        FetchError::ExceptionDuringFetch
    }
}
