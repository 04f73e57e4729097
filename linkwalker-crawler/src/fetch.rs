use crate::error::{Result, WalkError};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// HTTP collaborator for the walker: GETs one page body at a time.
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new() -> Self {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .user_agent(concat!("linkwalker/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("failed to build HTTP client");

        Self { client }
    }

    /// Fetch the body of an HTML page.
    ///
    /// Transport failures surface as `WalkError::Http`; a payload whose
    /// `Content-Type` says it is not HTML surfaces as `WalkError::Parse`
    /// so the caller never walks a binary blob. A missing `Content-Type`
    /// is given the benefit of the doubt.
    pub async fn fetch(&self, url: &Url) -> Result<String> {
        debug!("fetching {url}");
        let response = self.client.get(url.clone()).send().await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let is_html = content_type
            .as_deref()
            .is_none_or(|ct| ct.contains("text/html"));
        if !is_html {
            return Err(WalkError::Parse(format!(
                "{url} served content-type {}",
                content_type.unwrap_or_default()
            )));
        }

        debug!("fetched {url}: status {}", response.status());
        Ok(response.text().await?)
    }
}

impl Default for PageFetcher {
    fn default() -> Self {
        Self::new()
    }
}
