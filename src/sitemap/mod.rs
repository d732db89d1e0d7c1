//! Sitemap reader
//!
//! Resolves `/sitemap.xml` into a flat set of canonical URLs. Sitemap index
//! files are followed recursively with a depth bound (a cap against cycles
//! and explosion, not a cycle detector). Every fetch or parse failure is
//! swallowed and contributes an empty result for that branch: partial
//! sitemaps are acceptable and total failure yields an empty set.

use crate::url::canonicalize;
use reqwest::Client;
use std::collections::HashSet;
use url::Url;

/// Fetches the origin's sitemap and returns the canonical URLs it lists.
///
/// `max_depth` bounds how many levels of `<sitemapindex>` indirection are
/// followed (default 5 via config).
pub async fn fetch_sitemap_urls(client: &Client, origin: &Url, max_depth: u32) -> HashSet<String> {
    let mut urls = HashSet::new();

    let root = match origin.join("/sitemap.xml") {
        Ok(u) => u.to_string(),
        Err(_) => return urls,
    };

    // Worklist of (sitemap URL, remaining depth); children of an index are
    // pushed with one less depth until the cap trips.
    let mut pending = vec![(root, max_depth)];

    while let Some((sitemap_url, depth)) = pending.pop() {
        let body = match fetch_text(client, &sitemap_url).await {
            Some(body) => body,
            None => continue,
        };

        if body.contains("<sitemapindex") {
            if depth == 0 {
                tracing::warn!("Sitemap index depth cap reached at {}", sitemap_url);
                continue;
            }
            for block in extract_tag_contents(&body, "sitemap") {
                if let Some(child) = extract_first_tag_content(&block, "loc") {
                    pending.push((child, depth - 1));
                }
            }
        } else {
            for block in extract_tag_contents(&body, "url") {
                if let Some(loc) = extract_first_tag_content(&block, "loc") {
                    if let Some(canonical) = canonicalize(&loc, None) {
                        urls.insert(canonical);
                    }
                }
            }
        }
    }

    urls
}

async fn fetch_text(client: &Client, url: &str) -> Option<String> {
    match client.get(url).send().await {
        Ok(response) if response.status().is_success() => match response.text().await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::debug!("Failed to read sitemap body {}: {}", url, e);
                None
            }
        },
        Ok(response) => {
            tracing::debug!("Sitemap {} returned HTTP {}", url, response.status());
            None
        }
        Err(e) => {
            tracing::debug!("Failed to fetch sitemap {}: {}", url, e);
            None
        }
    }
}

/// Extracts the inner content of every `<tag>...</tag>` occurrence.
///
/// Plain scanning, no XML dependency; sitemap files are regular enough that
/// tag extraction covers the format in practice.
fn extract_tag_contents(xml: &str, tag: &str) -> Vec<String> {
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);
    let mut contents = Vec::new();
    let mut rest = xml;

    while let Some(start) = rest.find(&open) {
        let after_open = &rest[start + open.len()..];
        // Skip to the end of the opening tag; bail on a malformed document.
        let Some(gt) = after_open.find('>') else { break };
        let inner_start = &after_open[gt + 1..];
        let Some(end) = inner_start.find(&close) else { break };
        contents.push(inner_start[..end].to_string());
        rest = &inner_start[end + close.len()..];
    }

    contents
}

fn extract_first_tag_content(xml: &str, tag: &str) -> Option<String> {
    extract_tag_contents(xml, tag)
        .into_iter()
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
