use crate::UrlError;
use url::Url;

/// Turns a possibly-relative href plus an optional base URL into a canonical
/// absolute URL string.
///
/// # Canonical form
///
/// 1. Resolve `href` against `base` (or parse it as absolute)
/// 2. Lowercase scheme and host (the parser does this)
/// 3. Remove the fragment
/// 4. Remove the default port (80 for http, 443 for https)
/// 5. Remove trailing slashes from the path, except for the root path
///
/// Two URLs are the same crawl target iff their canonical forms are
/// byte-equal. Canonicalization is idempotent:
/// `canonicalize(canonicalize(x)) == canonicalize(x)`.
///
/// Returns `None` on unparseable input or a non-HTTP(S) scheme.
///
/// # Examples
///
/// ```
/// use linkledger::url::canonicalize;
///
/// let canon = canonicalize("HTTP://Example.COM:80/a/#frag", None).unwrap();
/// assert_eq!(canon, "http://example.com/a");
/// ```
pub fn canonicalize(href: &str, base: Option<&Url>) -> Option<String> {
    let mut url = match base {
        Some(base) => base.join(href.trim()).ok()?,
        None => Url::parse(href.trim()).ok()?,
    };

    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    url.set_fragment(None);

    // The url crate already lowercases scheme/host and drops default ports
    // during serialization, so only the path needs work here.
    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let stripped = path.trim_end_matches('/');
        let stripped = if stripped.is_empty() { "/" } else { stripped };
        let stripped = stripped.to_string();
        url.set_path(&stripped);
    }

    Some(url.to_string())
}

/// Answers same-origin queries against a fixed origin captured at
/// construction.
///
/// The crawl engine constructs one canonicalizer per run from the seed URL;
/// a link is internal iff its scheme, host, and port all match the seed's.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    origin: Url,
}

impl Canonicalizer {
    /// Creates a canonicalizer whose origin is taken from `seed`.
    ///
    /// Fails if the seed is unparseable, has a non-HTTP(S) scheme, or has no
    /// host.
    pub fn new(seed: &str) -> Result<Self, UrlError> {
        let origin = Url::parse(seed.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

        if origin.scheme() != "http" && origin.scheme() != "https" {
            return Err(UrlError::InvalidScheme(origin.scheme().to_string()));
        }
        if origin.host_str().is_none() {
            return Err(UrlError::MissingHost);
        }

        Ok(Self { origin })
    }

    /// Canonicalizes `href` resolved against this canonicalizer's origin.
    pub fn canonicalize(&self, href: &str) -> Option<String> {
        canonicalize(href, Some(&self.origin))
    }

    /// Returns true if `url` shares the origin's scheme, host, and port.
    pub fn is_same_origin(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(parsed) => {
                parsed.scheme() == self.origin.scheme()
                    && parsed.host_str() == self.origin.host_str()
                    && parsed.port_or_known_default() == self.origin.port_or_known_default()
            }
            Err(_) => false,
        }
    }

    /// The origin URL this canonicalizer was constructed from.
    pub fn origin(&self) -> &Url {
        &self.origin
    }
}
