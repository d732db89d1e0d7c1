use url::Url;

/// Allow/disallow path rules parsed from a robots.txt body, scoped to the
/// wildcard user agent.
///
/// Rules are kept in file order. A rule is a path prefix, optionally ending
/// in `*`, which matches by prefix before the `*`.
#[derive(Debug, Clone, Default)]
pub struct RobotsRuleset {
    allow: Vec<String>,
    disallow: Vec<String>,
}

impl RobotsRuleset {
    /// An empty ruleset that allows everything.
    ///
    /// Used when robots.txt is absent or unfetchable.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses a robots.txt body.
    ///
    /// Scans line by line, strips `#` comments, and tracks the currently
    /// active `User-agent:` group. Consecutive `User-agent:` lines form one
    /// group; a `User-agent:` line after a directive starts a new group.
    /// `Allow`/`Disallow` values are recorded only while the active group
    /// names the wildcard agent `*`.
    pub fn parse(text: &str) -> Self {
        let mut ruleset = Self::default();
        let mut wildcard_active = false;
        let mut in_agent_lines = false;

        for line in text.lines() {
            let line = match line.split_once('#') {
                Some((before, _)) => before.trim(),
                None => line.trim(),
            };
            if line.is_empty() {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    if in_agent_lines {
                        wildcard_active |= value == "*";
                    } else {
                        wildcard_active = value == "*";
                        in_agent_lines = true;
                    }
                }
                "allow" => {
                    in_agent_lines = false;
                    if wildcard_active && !value.is_empty() {
                        ruleset.allow.push(value.to_string());
                    }
                }
                "disallow" => {
                    in_agent_lines = false;
                    if wildcard_active && !value.is_empty() {
                        ruleset.disallow.push(value.to_string());
                    }
                }
                _ => {
                    // Crawl-delay, Sitemap, and unknown directives end the
                    // agent-line run but are otherwise ignored.
                    in_agent_lines = false;
                }
            }
        }

        ruleset
    }

    /// Returns true if the ruleset permits fetching `url`.
    ///
    /// The checked path is pathname plus query. An `Allow` match wins
    /// immediately; otherwise the longest matching `Disallow` prefix denies;
    /// no match at all allows.
    pub fn is_allowed(&self, url: &str) -> bool {
        let Some(path) = url_path(url) else {
            return true;
        };

        if self.allow.iter().any(|rule| rule_matches(rule, &path)) {
            return true;
        }

        !self
            .disallow
            .iter()
            .any(|rule| rule_matches(rule, &path))
    }

    /// Returns the longest matching disallow rule for `url`, if any.
    ///
    /// Used as evidence on robots-blocked page records.
    pub fn disallow_rule(&self, url: &str) -> Option<String> {
        let path = url_path(url)?;

        self.disallow
            .iter()
            .filter(|rule| rule_matches(rule, &path))
            .max_by_key(|rule| rule.len())
            .cloned()
    }

    /// True if no rules were recorded for the wildcard agent.
    pub fn is_empty(&self) -> bool {
        self.allow.is_empty() && self.disallow.is_empty()
    }

    /// The recorded disallow rules, in file order.
    pub fn disallow_rules(&self) -> &[String] {
        &self.disallow
    }
}

/// Extracts pathname + query from an absolute URL.
fn url_path(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let mut path = parsed.path().to_string();
    if let Some(query) = parsed.query() {
        path.push('?');
        path.push_str(query);
    }
    Some(path)
}

/// Matches a path against a single rule: plain rules match by prefix,
/// wildcard-suffix rules (`/foo*`) by prefix before the `*`.
fn rule_matches(rule: &str, path: &str) -> bool {
    match rule.strip_suffix('*') {
        Some(prefix) => path.starts_with(prefix),
        None => path.starts_with(rule),
    }
}
