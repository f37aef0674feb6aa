use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Per-navigation timeout used when none is configured
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("hackathon_finder/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error("navigation to {url} timed out")]
    Timeout { url: String },
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("navigation to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("no page available for {0}")]
    NotFound(String),
    #[error("browser session failed: {0}")]
    Session(String),
}

/// Something that can load a URL and hand back the rendered document
#[async_trait]
pub trait Browser: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<String, BrowserError>;
}

// ============================================================================
// HTTP BROWSER
// ============================================================================

/// Loads pages with plain HTTP requests
pub struct HttpBrowser {
    client: reqwest::Client,
}

impl HttpBrowser {
    pub fn new(timeout: Duration) -> Result<Self, BrowserError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| BrowserError::Session(e.to_string()))?;
        Ok(HttpBrowser { client })
    }
}

#[async_trait]
impl Browser for HttpBrowser {
    async fn navigate(&self, url: &str) -> Result<String, BrowserError> {
        let wrap = |source: reqwest::Error| {
            if source.is_timeout() {
                BrowserError::Timeout { url: url.to_string() }
            } else {
                BrowserError::Request { url: url.to_string(), source }
            }
        };

        let response = self.client.get(url).send().await.map_err(wrap)?;
        let status = response.status();
        if !status.is_success() {
            return Err(BrowserError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(wrap)
    }
}

// ============================================================================
// STATIC BROWSER
// ============================================================================

/// Serves pages from memory. Used for offline replays and tests.
#[derive(Debug, Default, Clone)]
pub struct StaticBrowser {
    pages: HashMap<String, String>,
    failing: HashSet<String>,
}

impl StaticBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the document returned for `url`
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// Makes navigation to `url` fail as if the session had crashed
    pub fn with_failure(mut self, url: impl Into<String>) -> Self {
        self.failing.insert(url.into());
        self
    }
}

#[async_trait]
impl Browser for StaticBrowser {
    async fn navigate(&self, url: &str) -> Result<String, BrowserError> {
        if self.failing.contains(url) {
            return Err(BrowserError::Session(format!("navigation to {} crashed", url)));
        }
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| BrowserError::NotFound(url.to_string()))
    }
}
