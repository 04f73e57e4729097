use crate::error::Result;
use crate::fetch::PageFetcher;
use linkwalker_core::{Asset, PageNode, VisitedSet, in_domain, resolve};
use scraper::Html;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};
use url::Url;

/// Single-domain crawl state: the root of the page tree and the crawl-wide
/// visited set.
///
/// The walker itself is synchronous and single-threaded; the visited set
/// sits behind a lock so registration stays a single test-and-set even if
/// a future orchestrator walks several pages concurrently.
pub struct Walker {
    root: Arc<PageNode>,
    visited: Mutex<VisitedSet>,
    fetcher: PageFetcher,
}

impl Walker {
    /// Build a walker from the seed URL. The seed's scheme and host define
    /// the crawl domain for the whole run; the visited set starts empty,
    /// so the seed URL itself can still be recorded as a child once if a
    /// page links back to it.
    pub fn new(seed: &str) -> Result<Self> {
        let url = Url::parse(seed)?;
        info!("crawl root: {url}");

        Ok(Self {
            root: PageNode::new(None, url),
            visited: Mutex::new(VisitedSet::new()),
            fetcher: PageFetcher::new(),
        })
    }

    /// Resize the visited set (expected distinct URLs, false-positive
    /// rate). Call before walking anything; replaces the set.
    pub fn with_visited_capacity(mut self, expected_urls: usize, false_positive_rate: f64) -> Self {
        self.visited = Mutex::new(VisitedSet::with_capacity(
            expected_urls,
            false_positive_rate,
        ));
        self
    }

    pub fn with_fetcher(mut self, fetcher: PageFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn root(&self) -> &Arc<PageNode> {
        &self.root
    }

    /// Node constructor. `None` builds an unparented node (the root form);
    /// otherwise the new node holds a back-reference to its parent.
    pub fn build_node(&self, parent: Option<&Arc<PageNode>>, url: Url) -> Arc<PageNode> {
        PageNode::new(parent, url)
    }

    /// Complete a raw attribute value against the crawl root.
    pub fn resolve(&self, raw: &str) -> Result<Url> {
        Ok(resolve(raw, self.root.url())?)
    }

    /// Whether a resolved URL is on the crawl domain.
    pub fn in_domain(&self, url: &Url) -> bool {
        in_domain(url, self.root.url())
    }

    /// Record `url` as a child of `node` if it is in-domain and not yet
    /// seen anywhere in the crawl. Returns whether it was recorded.
    ///
    /// The visited-set check and insert happen under one lock acquisition,
    /// so two pages racing on the same URL cannot both record it.
    pub fn register_link(&self, url: Url, node: &PageNode) -> bool {
        if !self.in_domain(&url) {
            debug!("off-domain, dropping {url}");
            return false;
        }

        let newly_added = self.visited.lock().unwrap().register(url.as_str());
        if newly_added {
            debug!("new page discovered: {url}");
            node.add_child(url);
        }
        newly_added
    }

    /// Walk a parsed document for `node`: depth-first pre-order over every
    /// node of the tree in document order, classifying anchors into
    /// `children` and img/link/script references into `assets`.
    ///
    /// Off-domain and already-visited links drop silently, as does any
    /// element missing its required attribute or carrying an attribute
    /// value that does not resolve to a URL.
    pub fn walk_page(&self, node: &PageNode, document: &Html) {
        for dom_node in document.tree.root().descendants() {
            let Some(element) = dom_node.value().as_element() else {
                continue;
            };

            match element.name() {
                "a" => {
                    if let Some(href) = element.attr("href") {
                        match self.resolve(href) {
                            Ok(url) => {
                                self.register_link(url, node);
                            }
                            Err(err) => debug!("unresolvable href {href:?}: {err}"),
                        }
                    }
                }
                "img" => self.record_asset(node, "img", element.attr("src")),
                "link" => {
                    if let Some(rel) = element.attr("rel") {
                        self.record_asset(node, rel, element.attr("href"));
                    }
                }
                "script" => self.record_asset(node, "js", element.attr("src")),
                _ => {}
            }
        }
    }

    /// Resolve and append one asset reference. Assets are recorded as-is:
    /// no deduplication and no domain check.
    fn record_asset(&self, node: &PageNode, kind: &str, raw: Option<&str>) {
        let Some(raw) = raw else { return };

        match self.resolve(raw) {
            Ok(url) => node.add_asset(Asset::new(kind, url)),
            Err(err) => debug!("unresolvable {kind} reference {raw:?}: {err}"),
        }
    }

    /// Fetch, parse, and walk one node's page. Failures are scoped to this
    /// node; the caller decides whether to skip, retry, or give up.
    pub async fn visit(&self, node: &PageNode) -> Result<()> {
        let body = self.fetcher.fetch(node.url()).await?;
        let document = Html::parse_document(&body);

        self.walk_page(node, &document);
        info!(
            "walked {}: {} children, {} assets",
            node.url(),
            node.children().len(),
            node.assets().len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WalkError;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn walker() -> Walker {
        Walker::new("https://example.com/").unwrap()
    }

    fn walk_fixture(w: &Walker, html: &str) -> Arc<PageNode> {
        let node = w.root().clone();
        let document = Html::parse_document(html);
        w.walk_page(&node, &document);
        node
    }

    #[test]
    fn test_invalid_seed_is_a_recoverable_error() {
        let result = Walker::new("not a url at all");
        assert!(matches!(result, Err(WalkError::InvalidUrl(_))));
    }

    #[test]
    fn test_classification_completeness() {
        let w = walker();
        let node = walk_fixture(
            &w,
            r#"<html><head>
                <link href="/site.css" rel="stylesheet">
            </head><body>
                <a href="/about">About</a>
                <img src="/logo.png">
                <script src="/app.js"></script>
                <a>no href, skipped</a>
            </body></html>"#,
        );

        let children = node.children();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].as_str(), "https://example.com/about");

        let assets = node.assets();
        let kinds: Vec<&str> = assets.iter().map(|a| a.kind.as_str()).collect();
        assert_eq!(kinds, vec!["stylesheet", "img", "js"]);
    }

    #[test]
    fn test_link_kind_is_the_literal_rel_value() {
        let w = walker();
        let node = walk_fixture(
            &w,
            r#"<link href="/feed.xml" rel="alternate"><link href="/x.css">"#,
        );

        // The rel-less <link> is skipped entirely.
        let assets = node.assets();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].kind, "alternate");
        assert_eq!(assets[0].url.as_str(), "https://example.com/feed.xml");
    }

    #[test]
    fn test_off_domain_links_drop_silently() {
        let w = walker();
        let node = walk_fixture(
            &w,
            r#"<a href="https://other.com/">external</a>
               <a href="//github.com/someone">scheme-relative external</a>
               <a href="http://example.com/">wrong scheme</a>
               <a href="/ok">internal</a>"#,
        );

        let children = node.children();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].path(), "/ok");
    }

    #[test]
    fn test_duplicate_links_are_registered_once_crawl_wide() {
        let w = walker().with_visited_capacity(1000, 0.001);
        let first = walk_fixture(&w, r#"<a href="/about">a</a><a href="/about">b</a>"#);
        assert_eq!(first.children().len(), 1);

        // A second page referencing the same URL records nothing.
        let second = w.build_node(
            Some(w.root()),
            w.resolve("/contact").unwrap(),
        );
        let document = Html::parse_document(r#"<a href="/about">again</a>"#);
        w.walk_page(&second, &document);
        assert!(second.children().is_empty());
    }

    #[test]
    fn test_assets_are_not_deduplicated_or_domain_filtered() {
        let w = walker();
        let node = walk_fixture(
            &w,
            r#"<img src="/logo.png"><img src="/logo.png">
               <script src="https://cdn.other.com/lib.js"></script>"#,
        );

        let assets = node.assets();
        assert_eq!(assets.len(), 3);
        assert_eq!(assets[0].url, assets[1].url);
        assert_eq!(assets[2].url.host_str(), Some("cdn.other.com"));
    }

    #[test]
    fn test_document_order_is_preserved_across_nesting() {
        let w = walker();
        let node = walk_fixture(
            &w,
            r#"<div><a href="/first">1</a>
                 <section><img src="/a.png"><a href="/second">2</a></section>
               </div>
               <a href="/third">3</a><img src="/b.png">"#,
        );

        let children = node.children();
        let paths: Vec<&str> = children.iter().map(|u| u.path()).collect();
        assert_eq!(paths, vec!["/first", "/second", "/third"]);

        let assets = node.assets();
        let asset_paths: Vec<&str> = assets.iter().map(|a| a.url.path()).collect();
        assert_eq!(asset_paths, vec!["/a.png", "/b.png"]);
    }

    #[test]
    fn test_fragment_links_are_distinct_entries() {
        // Fragments are carried through, not canonicalized away.
        let w = walker();
        let node = walk_fixture(
            &w,
            r#"<a href="/page#a">a</a><a href="/page#b">b</a><a href="/page#a">dup</a>"#,
        );

        let children = node.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].fragment(), Some("a"));
        assert_eq!(children[1].fragment(), Some("b"));
    }

    #[test]
    fn test_seed_url_can_be_discovered_as_a_child_once() {
        let w = walker();
        let node = walk_fixture(&w, r#"<a href="/">home</a><a href="/">home again</a>"#);

        let children = node.children();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].as_str(), "https://example.com/");
    }

    #[tokio::test]
    async fn test_visit_fetches_parses_and_walks() {
        let mock_server = MockServer::start().await;

        let html = r#"<html><body>
            <a href="/page1">Page 1</a>
            <img src="/logo.png">
            <a href="https://elsewhere.org/">external</a>
        </body></html>"#;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(html, "text/html"),
            )
            .mount(&mock_server)
            .await;

        let w = Walker::new(&mock_server.uri())
            .unwrap()
            .with_fetcher(PageFetcher::with_timeout(5));
        let root = w.root().clone();
        w.visit(&root).await.unwrap();

        let children = root.children();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].path(), "/page1");
        assert_eq!(root.assets().len(), 1);
    }

    #[tokio::test]
    async fn test_visit_rejects_non_html_payloads() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/pdf")
                    .set_body_string("%PDF-1.4"),
            )
            .mount(&mock_server)
            .await;

        let w = Walker::new(&mock_server.uri()).unwrap();
        let root = w.root().clone();

        let result = w.visit(&root).await;
        assert!(matches!(result, Err(WalkError::Parse(_))));
        assert!(root.children().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_scoped_to_the_node() {
        // Nothing listens here; the connection is refused.
        let w = Walker::new("http://127.0.0.1:1/").unwrap();
        let root = w.root().clone();

        let result = w.visit(&root).await;
        assert!(matches!(result, Err(WalkError::Http(_))));

        // The walker is still usable for other nodes afterwards.
        let node = w.build_node(Some(w.root()), w.resolve("/next").unwrap());
        let document = Html::parse_document(r#"<a href="/next/page">n</a>"#);
        w.walk_page(&node, &document);
        assert_eq!(node.children().len(), 1);
    }
}
