use serde::Deserialize;

/// Main configuration structure for an audit run
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

/// The site under audit
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Seed URL; its origin bounds the crawl
    pub url: String,
}

/// Page budget: a hard cap on pages fetched, or no cap at all.
///
/// Written in TOML as an integer or the string `"unlimited"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "PageBudgetRepr")]
pub enum PageBudget {
    Unlimited,
    Limited(u64),
}

impl PageBudget {
    pub fn is_reached(&self, pages: u64) -> bool {
        match self {
            Self::Unlimited => false,
            Self::Limited(cap) => pages >= *cap,
        }
    }
}

impl std::fmt::Display for PageBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unlimited => f.write_str("unlimited"),
            Self::Limited(cap) => write!(f, "{}", cap),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageBudgetRepr {
    Count(u64),
    Keyword(String),
}

impl TryFrom<PageBudgetRepr> for PageBudget {
    type Error = String;

    fn try_from(repr: PageBudgetRepr) -> Result<Self, Self::Error> {
        match repr {
            PageBudgetRepr::Count(n) => Ok(Self::Limited(n)),
            PageBudgetRepr::Keyword(word) if word == "unlimited" => Ok(Self::Unlimited),
            PageBudgetRepr::Keyword(word) => Err(format!(
                "page-budget must be an integer or \"unlimited\", got \"{}\"",
                word
            )),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of pages to fetch, or unlimited
    #[serde(rename = "page-budget", default = "default_page_budget")]
    pub page_budget: PageBudget,

    /// Maximum redirect hops followed for one URL
    #[serde(rename = "max-redirect-hops", default = "default_max_redirect_hops")]
    pub max_redirect_hops: u32,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Recursion cap for sitemap index resolution
    #[serde(rename = "sitemap-depth", default = "default_sitemap_depth")]
    pub sitemap_depth: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_budget: default_page_budget(),
            max_redirect_hops: default_max_redirect_hops(),
            request_timeout_secs: default_request_timeout(),
            sitemap_depth: default_sitemap_depth(),
        }
    }
}

fn default_page_budget() -> PageBudget {
    PageBudget::Unlimited
}

fn default_max_redirect_hops() -> u32 {
    5
}

fn default_request_timeout() -> u64 {
    10
}

fn default_sitemap_depth() -> u32 {
    5
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the full user agent string:
    /// `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn format(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path the markdown report is written to
    #[serde(rename = "report-path")]
    pub report_path: String,

    /// Optional path for the JSON artifact
    #[serde(rename = "json-path", default)]
    pub json_path: Option<String>,
}

/// Classification stage configuration; disabled unless switched on.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub enabled: bool,

    /// HTTP endpoint the batches are POSTed to
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            batch_size: default_batch_size(),
            workers: default_workers(),
        }
    }
}

fn default_batch_size() -> usize {
    8
}

fn default_workers() -> usize {
    4
}
