use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, Weak};
use url::Url;

/// A non-page resource referenced by a page: an image, a stylesheet (or
/// other `<link>` relation), or a script. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Free-form tag: `"img"`, `"js"`, or the literal `rel` value of a
    /// `<link>` element (e.g. `"stylesheet"`).
    pub kind: String,
    /// Fully resolved URL of the resource.
    pub url: Url,
}

impl Asset {
    pub fn new(kind: impl Into<String>, url: Url) -> Self {
        Self {
            kind: kind.into(),
            url,
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Asset[{}] = {}", self.kind, self.url)
    }
}

/// One crawled page: its URL, a back-reference to the page that discovered
/// it, and the links and assets found on it in document order.
///
/// Nodes are shared (`Arc`) and append-only; the child/asset lists are
/// lock-guarded so a future concurrent orchestrator can walk several pages
/// against the same tree without restructuring this type.
#[derive(Debug)]
pub struct PageNode {
    url: Url,
    parent: Option<Weak<PageNode>>,
    children: Mutex<Vec<Url>>,
    assets: Mutex<Vec<Asset>>,
}

impl PageNode {
    /// Build a node. The crawl root passes `None`; every other node is
    /// parented exactly once, here, and never re-parented.
    pub fn new(parent: Option<&Arc<PageNode>>, url: Url) -> Arc<Self> {
        Arc::new(Self {
            url,
            parent: parent.map(Arc::downgrade),
            children: Mutex::new(Vec::new()),
            assets: Mutex::new(Vec::new()),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The node that discovered this one. `None` for the crawl root (and
    /// for a node whose parent has already been dropped).
    pub fn parent(&self) -> Option<Arc<PageNode>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Append a discovered child-page URL. Callers are expected to have
    /// run the URL through domain matching and visited-set registration
    /// first; this method records unconditionally.
    pub fn add_child(&self, url: Url) {
        self.children.lock().unwrap().push(url);
    }

    /// Append a discovered asset. Assets are never deduplicated.
    pub fn add_asset(&self, asset: Asset) {
        self.assets.lock().unwrap().push(asset);
    }

    /// Snapshot of the child URLs discovered on this page, in document
    /// order.
    pub fn children(&self) -> Vec<Url> {
        self.children.lock().unwrap().clone()
    }

    /// Snapshot of the assets discovered on this page, in document order.
    pub fn assets(&self) -> Vec<Asset> {
        self.assets.lock().unwrap().clone()
    }
}
