//! Document parser
//!
//! Turns an HTML body into the metadata and link lists the crawl engine
//! records: title, h1s, robots/description meta tags, every outbound link
//! classified as internal or external, and the content-region links handed
//! to the optional classification stage.

use crate::record::ContentLink;
use crate::url::{canonicalize, Canonicalizer};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Path prefixes excluded from content-link extraction. Links into system
/// flows carry no editorial intent worth classifying.
const SYSTEM_PATHS: &[&str] = &["/cart", "/checkout", "/login", "/logout", "/account", "/search"];

/// One `<a href>` found anywhere on the page.
#[derive(Debug, Clone)]
pub struct ExtractedLink {
    /// The href as written in the document.
    pub original: String,
    /// Canonical absolute form, when the href is resolvable.
    pub normalized: Option<String>,
    /// True when the canonical form shares the crawl origin.
    pub is_internal: bool,
}

/// Everything the crawl engine wants from one HTML document.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    pub title: Option<String>,
    pub h1s: Vec<String>,
    pub meta_robots: Option<String>,
    pub meta_description: Option<String>,
    pub links: Vec<ExtractedLink>,
    pub content_links: Vec<ContentLink>,
}

/// Parses `html` against `base_url` (the URL the document was fetched from,
/// after redirects) and classifies links against the run's origin.
pub fn parse_document(html: &str, base_url: &Url, canonicalizer: &Canonicalizer) -> ParsedDocument {
    let document = Html::parse_document(html);

    let mut parsed = ParsedDocument {
        title: select_text(&document, "title"),
        h1s: select_all_text(&document, "h1"),
        meta_robots: select_meta_content(&document, "robots"),
        meta_description: select_meta_content(&document, "description"),
        ..Default::default()
    };

    let Ok(anchor_selector) = Selector::parse("a[href]") else {
        return parsed;
    };
    let mut seen_content: Vec<(String, String)> = Vec::new();

    for element in document.select(&anchor_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        if skip_href(href) {
            continue;
        }

        let normalized = canonicalize(href, Some(base_url));
        let is_internal = normalized
            .as_deref()
            .map(|n| canonicalizer.is_same_origin(n))
            .unwrap_or(false);

        if let (true, Some(destination)) = (is_internal, normalized.as_deref()) {
            if let Some(context) = content_context(&element) {
                if !is_system_path(destination) {
                    let anchor_text = element.text().collect::<String>().trim().to_string();
                    let key = (destination.to_string(), anchor_text.clone());
                    // De-duplicated by (destination, anchor text).
                    if !seen_content.contains(&key) {
                        seen_content.push(key);
                        parsed.content_links.push(ContentLink {
                            source_url: base_url.to_string(),
                            destination_url: destination.to_string(),
                            anchor_text,
                            context_type: context.to_string(),
                        });
                    }
                }
            }
        }

        parsed.links.push(ExtractedLink {
            original: href.to_string(),
            normalized,
            is_internal,
        });
    }

    parsed
}

fn skip_href(href: &str) -> bool {
    href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
}

fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn select_all_text(document: &Html, selector: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .collect()
}

fn select_meta_content(document: &Html, name: &str) -> Option<String> {
    let selector = Selector::parse(&format!("meta[name='{}']", name)).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Decides whether an anchor sits in a content region, and names the
/// nearest content container if so.
///
/// Anchors inside nav, header, footer, or aside are chrome, not content.
fn content_context(element: &ElementRef) -> Option<&'static str> {
    let mut context = "body";
    for ancestor in element.ancestors().filter_map(ElementRef::wrap) {
        match ancestor.value().name() {
            "nav" | "header" | "footer" | "aside" => return None,
            "article" => context = "article",
            "main" if context == "body" => context = "main",
            _ => {}
        }
    }
    Some(context)
}

fn is_system_path(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let path = parsed.path();
    SYSTEM_PATHS
        .iter()
        .any(|prefix| path == *prefix || path.starts_with(&format!("{}/", prefix)))
}
