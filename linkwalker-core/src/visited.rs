use crate::bloom::BloomFilter;
use tracing::debug;

/// Default sizing: room for ~20k distinct page URLs at a 1% false-positive
/// target.
pub const DEFAULT_CAPACITY: usize = 20_000;
pub const DEFAULT_FALSE_POSITIVE_RATE: f64 = 0.01;

/// Crawl-wide record of which page URLs have been registered.
///
/// Probabilistic: a false positive makes a genuinely new URL look already
/// visited (a small, bounded under-crawl), but a registered URL is never
/// admitted twice. Memory is fixed regardless of crawl size, and entries
/// are never removed.
///
/// Keys are exact serialized URL strings; two logically identical URLs
/// that serialize differently count as different entries.
#[derive(Debug)]
pub struct VisitedSet {
    filter: BloomFilter,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY, DEFAULT_FALSE_POSITIVE_RATE)
    }

    pub fn with_capacity(expected_urls: usize, false_positive_rate: f64) -> Self {
        Self {
            filter: BloomFilter::new(expected_urls, false_positive_rate),
        }
    }

    /// Test-and-set: returns true iff this is the first registration of
    /// `url`. Repeat registrations are a no-op and return false.
    pub fn register(&mut self, url: &str) -> bool {
        let key = url.as_bytes();
        if self.filter.contains(key) {
            debug!("already registered: {url}");
            return false;
        }
        self.filter.insert(key);
        true
    }

    /// Membership probe without inserting.
    pub fn contains(&self, url: &str) -> bool {
        self.filter.contains(url.as_bytes())
    }
}

impl Default for VisitedSet {
    fn default() -> Self {
        Self::new()
    }
}
