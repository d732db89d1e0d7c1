use serde::Serialize;
use std::collections::HashMap;

/// Classification of a fetched response by its Content-Type.
///
/// Only `text/html` responses are pages; pages are eligible for metadata
/// checks and traversal continuation, and only pages count toward the page
/// budget. Everything else (stylesheets, images, PDFs, feeds) is a resource:
/// recorded, but free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Page,
    Resource,
}

/// Local, recoverable, per-URL fetch failures.
///
/// A fetch error terminates processing of that one URL and classifies it as
/// a page with no metadata; it never aborts the run and the URL is never
/// retried within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchError {
    NetworkError,
    MaxRedirectsExceeded,
    ExceptionDuringFetch,
    UnknownFetchFailure,
}

impl FetchError {
    /// Database/report string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "network_error",
            Self::MaxRedirectsExceeded => "max_redirects_exceeded",
            Self::ExceptionDuringFetch => "exception_during_fetch",
            Self::UnknownFetchFailure => "unknown_fetch_failure",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "network_error" => Some(Self::NetworkError),
            "max_redirects_exceeded" => Some(Self::MaxRedirectsExceeded),
            "exception_during_fetch" => Some(Self::ExceptionDuringFetch),
            "unknown_fetch_failure" => Some(Self::UnknownFetchFailure),
            _ => None,
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An anchor/destination pair found in a content region of a page.
///
/// Produced for the classification stage only; content links never feed
/// graph construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentLink {
    pub source_url: String,
    pub destination_url: String,
    pub anchor_text: String,
    pub context_type: String,
}

/// The per-URL result of one fetch attempt.
#[derive(Debug, Clone, Serialize)]
pub struct PageRecord {
    /// The URL as enqueued (canonical form).
    pub url: String,

    /// The URL the fetch ended on, after following redirects.
    pub final_url: String,

    /// Page/resource classification; unset when the fetch never produced a
    /// classifiable response.
    pub resource_type: Option<ResourceType>,

    /// Terminal HTTP status, if a response was received.
    pub http_status: Option<u16>,

    /// Ordered pre-redirect URLs of each hop taken; may contain repeats.
    pub redirect_chain: Vec<String>,

    /// Set when the fetch attempt failed; the record then carries no
    /// metadata.
    pub fetch_error: Option<FetchError>,

    /// Response headers with lowercased names.
    pub headers: HashMap<String, String>,

    /// Lowercased X-Robots-Tag header value, if present.
    pub x_robots_tag: Option<String>,

    pub title: Option<String>,
    pub h1s: Vec<String>,
    pub meta_description: Option<String>,
    pub meta_robots: Option<String>,

    /// Canonical URLs of distinct same-origin link targets on this page.
    pub internal_outgoing_links: Vec<String>,

    /// Raw URLs of off-origin link targets; recorded, never enqueued.
    pub external_outgoing_links: Vec<String>,

    /// Content-region anchor/destination pairs for the classifier stage.
    pub content_internal_links: Vec<ContentLink>,

    /// Number of distinct pages linking here; set post-traversal.
    pub incoming_internal_link_count: u32,

    pub blocked_by_robots: bool,
    pub blocked_by_robots_rule: Option<String>,
}

impl PageRecord {
    /// Creates the blank record made when a URL is dequeued.
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            final_url: url.to_string(),
            resource_type: None,
            http_status: None,
            redirect_chain: Vec::new(),
            fetch_error: None,
            headers: HashMap::new(),
            x_robots_tag: None,
            title: None,
            h1s: Vec::new(),
            meta_description: None,
            meta_robots: None,
            internal_outgoing_links: Vec::new(),
            external_outgoing_links: Vec::new(),
            content_internal_links: Vec::new(),
            incoming_internal_link_count: 0,
            blocked_by_robots: false,
            blocked_by_robots_rule: None,
        }
    }

    /// True for records classified as pages.
    pub fn is_page(&self) -> bool {
        self.resource_type == Some(ResourceType::Page)
    }

    /// True for pages that answered HTTP 200 with parsed metadata.
    pub fn is_ok_page(&self) -> bool {
        self.is_page() && self.http_status == Some(200)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_blank() {
        let record = PageRecord::new("https://example.com/");
        assert_eq!(record.url, "https://example.com/");
        assert_eq!(record.final_url, "https://example.com/");
        assert_eq!(record.resource_type, None);
        assert_eq!(record.http_status, None);
        assert!(record.redirect_chain.is_empty());
        assert!(!record.blocked_by_robots);
        assert_eq!(record.incoming_internal_link_count, 0);
    }

    #[test]
    fn test_is_ok_page() {
        let mut record = PageRecord::new("https://example.com/");
        assert!(!record.is_ok_page());

        record.resource_type = Some(ResourceType::Page);
        record.http_status = Some(200);
        assert!(record.is_ok_page());

        record.http_status = Some(404);
        assert!(record.is_page());
        assert!(!record.is_ok_page());
    }

    #[test]
    fn test_fetch_error_round_trip() {
        for error in [
            FetchError::NetworkError,
            FetchError::MaxRedirectsExceeded,
            FetchError::ExceptionDuringFetch,
            FetchError::UnknownFetchFailure,
        ] {
            assert_eq!(FetchError::from_str(error.as_str()), Some(error));
        }
        assert_eq!(FetchError::from_str("bogus"), None);
    }
}
