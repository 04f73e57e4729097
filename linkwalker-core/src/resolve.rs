use url::{ParseError, Url};

/// Complete a possibly-relative URL against the crawl root.
///
/// A host-less input ("about", "/about") is path-relative to the root and
/// inherits both its scheme and host. A scheme-relative input
/// ("//other.com/x") keeps its host and inherits only the scheme, so it
/// can legitimately resolve off-domain. An absolute URL passes through
/// untouched. Query strings and fragments are carried as-is.
pub fn resolve(raw: &str, root: &Url) -> Result<Url, ParseError> {
    root.join(raw)
}

/// Whether `url` belongs to the crawl domain: scheme, host, and port all
/// equal the root's. Exact equality; subdomains do not match.
pub fn in_domain(url: &Url, root: &Url) -> bool {
    url.scheme() == root.scheme()
        && url.host_str() == root.host_str()
        && url.port() == root.port()
}
