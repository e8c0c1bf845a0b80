use crate::error::AcquireError;
use crate::BASE_URL;
use reqwest::header::REFERER;
use reqwest::Url;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Something that can turn a page URL into its HTML.
pub trait PageSource {
    fn fetch_page(&self, url: &str) -> impl Future<Output = Result<String, AcquireError>> + Send;
}

/// Something that can store the bytes behind a URL at a local path.
///
/// Returns the number of bytes written.
pub trait AssetSink {
    fn save(
        &self,
        url: &str,
        dest: &Path,
    ) -> impl Future<Output = Result<u64, AcquireError>> + Send;
}

/// HTTP client settings.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub user_agent: String,
    /// Sent as `Referer` on asset downloads.
    pub referer: String,
    pub page_timeout: Duration,
    pub asset_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            referer: format!("{BASE_URL}/"),
            page_timeout: Duration::from_secs(30),
            asset_timeout: Duration::from_secs(60),
        }
    }
}

/// reqwest-backed [`PageSource`] and [`AssetSink`].
///
/// Pages and assets use separate clients so each gets its own timeout.
pub struct HttpClient {
    pages: reqwest::Client,
    assets: reqwest::Client,
    referer: String,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self, AcquireError> {
        let build = |timeout: Duration| {
            reqwest::Client::builder()
                .user_agent(config.user_agent.as_str())
                .timeout(timeout)
                .build()
                .map_err(|e| AcquireError::Fetch {
                    url: String::new(),
                    reason: format!("could not build HTTP client: {e}"),
                })
        };

        Ok(Self {
            pages: build(config.page_timeout)?,
            assets: build(config.asset_timeout)?,
            referer: config.referer.clone(),
        })
    }
}

fn fetch_error(url: &str, err: reqwest::Error) -> AcquireError {
    AcquireError::Fetch {
        url: url.to_string(),
        reason: err.to_string(),
    }
}

impl PageSource for HttpClient {
    async fn fetch_page(&self, url: &str) -> Result<String, AcquireError> {
        tracing::debug!(url = %url, "Fetching page");
        let response = self
            .pages
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AcquireError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response.text().await.map_err(|e| fetch_error(url, e))?;
        tracing::debug!(url = %url, bytes = html.len(), "Received HTML");
        Ok(html)
    }
}

impl AssetSink for HttpClient {
    async fn save(&self, url: &str, dest: &Path) -> Result<u64, AcquireError> {
        let mut response = self
            .assets
            .get(url)
            .header(REFERER, self.referer.as_str())
            .send()
            .await
            .map_err(|e| fetch_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AcquireError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let save_error = |source: std::io::Error| AcquireError::Save {
            path: dest.to_path_buf(),
            source,
        };

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(save_error)?;
        }
        let mut file = tokio::fs::File::create(dest).await.map_err(save_error)?;

        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await.map_err(|e| fetch_error(url, e))? {
            file.write_all(&chunk).await.map_err(save_error)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(save_error)?;

        tracing::debug!(url = %url, path = %dest.display(), bytes = written, "Saved asset");
        Ok(written)
    }
}

/// Resolve an href found on a page against the site origin.
///
/// Absolute hrefs are returned unchanged.
pub fn resolve_href(href: &str) -> Result<Url, AcquireError> {
    let parse_error = |reason: String| AcquireError::Parse {
        url: href.to_string(),
        reason,
    };
    let base = Url::parse(BASE_URL).map_err(|e| parse_error(e.to_string()))?;
    base.join(href).map_err(|e| parse_error(e.to_string()))
}
