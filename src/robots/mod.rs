//! Robots.txt handling module
//!
//! Fetches and parses robots.txt for the audited origin. The engine crawls
//! under a single fixed identity, so only the wildcard `User-agent: *` block
//! is evaluated; blocks for named agents are parsed past but not recorded.

mod ruleset;

pub use ruleset::RobotsRuleset;

use reqwest::Client;
use url::Url;

/// Fetches and parses robots.txt for the given origin.
///
/// An unfetchable or absent robots.txt is never fatal: any request error or
/// non-success status degrades to an empty ruleset that allows everything.
pub async fn fetch_robots(client: &Client, origin: &Url) -> RobotsRuleset {
    let robots_url = match origin.join("/robots.txt") {
        Ok(u) => u,
        Err(_) => return RobotsRuleset::empty(),
    };

    match client.get(robots_url.clone()).send().await {
        Ok(response) if response.status().is_success() => match response.text().await {
            Ok(body) => RobotsRuleset::parse(&body),
            Err(e) => {
                tracing::warn!("Failed to read robots.txt body: {}", e);
                RobotsRuleset::empty()
            }
        },
        Ok(response) => {
            tracing::debug!(
                "robots.txt returned HTTP {}, allowing everything",
                response.status()
            );
            RobotsRuleset::empty()
        }
        Err(e) => {
            tracing::warn!("Failed to fetch {}: {}", robots_url, e);
            RobotsRuleset::empty()
        }
    }
}
