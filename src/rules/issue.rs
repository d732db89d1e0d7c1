use serde::Serialize;

/// Where a noindex directive was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoindexSource {
    MetaRobots,
    XRobotsTag,
}

impl NoindexSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MetaRobots => "meta_robots",
            Self::XRobotsTag => "x_robots_tag",
        }
    }
}

/// A typed finding produced by the rule evaluation engine.
///
/// One variant per issue kind, each carrying the offending URL(s) and the
/// evidence that made the predicate fire. Issues are pure derived data:
/// produced once, appended to a flat ordered list, never mutated.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    BrokenPage {
        url: String,
        http_status: u16,
    },
    BrokenInternalLink {
        source_url: String,
        target_url: String,
        target_status: u16,
    },
    RedirectChain {
        url: String,
        redirect_chain: Vec<String>,
        final_url: String,
    },
    RedirectLoop {
        url: String,
        redirect_chain: Vec<String>,
        final_url: String,
    },
    BlockedByRobots {
        url: String,
        rule: Option<String>,
    },
    NoindexPage {
        url: String,
        source: NoindexSource,
        directive: String,
    },
    SitemapOrphan {
        url: String,
    },
    ZeroIncomingLinks {
        url: String,
    },
    ZeroOutgoingLinks {
        url: String,
    },
    MissingTitle {
        url: String,
    },
    MissingH1 {
        url: String,
    },
    /// One issue per affected URL, each evidencing the whole group.
    DuplicateTitle {
        url: String,
        title: String,
        shared_with: Vec<String>,
    },
    /// One issue per group, listing every affected URL. The asymmetry with
    /// DuplicateTitle is inherited by downstream consumers.
    DuplicateMetaDescription {
        meta_description: String,
        urls: Vec<String>,
    },
    MultipleH1 {
        url: String,
        count: usize,
    },
    /// Classifier-supplied: the anchor text promises something the
    /// destination does not deliver.
    AnchorMismatch {
        source_url: String,
        destination_url: String,
        anchor_text: String,
        confidence: f64,
        explanation: String,
    },
    /// Classifier-supplied: a 200 page that reads like an error page.
    SoftErrorPage {
        url: String,
        confidence: f64,
        explanation: String,
    },
}

impl Issue {
    /// Stable string code for storage and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BrokenPage { .. } => "broken_page",
            Self::BrokenInternalLink { .. } => "broken_internal_link",
            Self::RedirectChain { .. } => "redirect_chain",
            Self::RedirectLoop { .. } => "redirect_loop",
            Self::BlockedByRobots { .. } => "blocked_by_robots",
            Self::NoindexPage { .. } => "noindex_page",
            Self::SitemapOrphan { .. } => "sitemap_orphan",
            Self::ZeroIncomingLinks { .. } => "zero_incoming_links",
            Self::ZeroOutgoingLinks { .. } => "zero_outgoing_links",
            Self::MissingTitle { .. } => "missing_title",
            Self::MissingH1 { .. } => "missing_h1",
            Self::DuplicateTitle { .. } => "duplicate_title",
            Self::DuplicateMetaDescription { .. } => "duplicate_meta_description",
            Self::MultipleH1 { .. } => "multiple_h1",
            Self::AnchorMismatch { .. } => "anchor_mismatch",
            Self::SoftErrorPage { .. } => "soft_error_page",
        }
    }

    /// The URL a report groups this issue under.
    pub fn primary_url(&self) -> &str {
        match self {
            Self::BrokenPage { url, .. }
            | Self::RedirectChain { url, .. }
            | Self::RedirectLoop { url, .. }
            | Self::BlockedByRobots { url, .. }
            | Self::NoindexPage { url, .. }
            | Self::SitemapOrphan { url }
            | Self::ZeroIncomingLinks { url }
            | Self::ZeroOutgoingLinks { url }
            | Self::MissingTitle { url }
            | Self::MissingH1 { url }
            | Self::DuplicateTitle { url, .. }
            | Self::MultipleH1 { url, .. }
            | Self::SoftErrorPage { url, .. } => url,
            Self::BrokenInternalLink { source_url, .. }
            | Self::AnchorMismatch { source_url, .. } => source_url,
            Self::DuplicateMetaDescription { urls, .. } => {
                urls.first().map(String::as_str).unwrap_or("")
            }
        }
    }

    /// Human-readable explanation of the finding.
    pub fn message(&self) -> String {
        match self {
            Self::BrokenPage { url, http_status } => {
                format!("{} returned HTTP {}", url, http_status)
            }
            Self::BrokenInternalLink {
                source_url,
                target_url,
                target_status,
            } => format!(
                "{} links to {} which returned HTTP {}",
                source_url, target_url, target_status
            ),
            Self::RedirectChain {
                url,
                redirect_chain,
                final_url,
            } => format!(
                "{} reaches {} through {} redirects",
                url,
                final_url,
                redirect_chain.len()
            ),
            Self::RedirectLoop { url, .. } => {
                format!("{} enters a redirect loop", url)
            }
            Self::BlockedByRobots { url, rule } => match rule {
                Some(rule) => format!("{} is blocked by robots.txt rule {}", url, rule),
                None => format!("{} is blocked by robots.txt", url),
            },
            Self::NoindexPage {
                url,
                source,
                directive,
            } => format!(
                "{} carries a noindex directive in {} ({})",
                url,
                source.as_str(),
                directive
            ),
            Self::SitemapOrphan { url } => {
                format!("{} is listed in the sitemap but was never reached", url)
            }
            Self::ZeroIncomingLinks { url } => {
                format!("{} has no incoming internal links", url)
            }
            Self::ZeroOutgoingLinks { url } => {
                format!("{} has no outgoing internal links", url)
            }
            Self::MissingTitle { url } => format!("{} has no <title>", url),
            Self::MissingH1 { url } => format!("{} has no <h1>", url),
            Self::DuplicateTitle {
                url,
                title,
                shared_with,
            } => format!(
                "{} shares the title {:?} with {} other page(s)",
                url,
                title,
                shared_with.len().saturating_sub(1)
            ),
            Self::DuplicateMetaDescription {
                meta_description,
                urls,
            } => format!(
                "{} pages share the meta description {:?}",
                urls.len(),
                meta_description
            ),
            Self::MultipleH1 { url, count } => {
                format!("{} has {} <h1> elements", url, count)
            }
            Self::AnchorMismatch {
                source_url,
                destination_url,
                anchor_text,
                ..
            } => format!(
                "Anchor {:?} on {} does not match the content of {}",
                anchor_text, source_url, destination_url
            ),
            Self::SoftErrorPage { url, .. } => {
                format!("{} returns 200 but reads like an error page", url)
            }
        }
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind(), self.message())
    }
}
