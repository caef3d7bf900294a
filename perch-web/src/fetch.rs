//! Page fetching behind a trait so tests can substitute canned pages.

use anyhow::Result;
use async_trait::async_trait;
use perch_http::{HttpClient, RequestOpts};

/// Source of page HTML and image bytes, keyed by absolute URL.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_html(&self, url: &str) -> Result<String>;
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// Production implementation over the shared HTTP client.
#[derive(Clone)]
pub struct HttpPageSource {
    http: HttpClient,
}

/// Dataset rows carry absolute URLs; the base only anchors the client.
const GUIDE_BASE: &str = "https://www.allaboutbirds.org";

impl HttpPageSource {
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(GUIDE_BASE)?,
        })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_html(&self, url: &str) -> Result<String> {
        tracing::debug!(%url, "page.fetch_html");
        let html = self
            .http
            .get_text(
                url,
                RequestOpts {
                    allow_absolute: true,
                    ..Default::default()
                },
            )
            .await?;
        Ok(html)
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!(%url, "page.fetch_bytes");
        let bytes = self
            .http
            .get_bytes(
                url,
                RequestOpts {
                    allow_absolute: true,
                    ..Default::default()
                },
            )
            .await?;
        Ok(bytes)
    }
}
