use crate::error::{Result, ScanError};
use crate::extract::extract_page;
use crate::kind::EntityKind;
use crate::result::PageRecord;
use crate::source::PageSource;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_USER_AGENT: &str = "castgraph/0.1 (https://github.com/trapdoorsec/castgraph)";

/// Fetches wiki articles over HTTP and extracts actor/movie records from them.
pub struct WikiSource {
    client: Client,
}

impl WikiSource {
    pub fn new() -> Result<Self> {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn fetch(&self, link: &str) -> Result<String> {
        let url = Url::parse(link).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", link, e)))?;

        info!("Accessing {}", url);
        let start = Instant::now();
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::HttpStatus {
                url: link.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!("Fetched {} ({} bytes) in {:?}", link, body.len(), start.elapsed());
        Ok(body)
    }
}

impl PageSource for WikiSource {
    async fn fetch_and_extract(&self, link: &str, kind: EntityKind) -> Result<PageRecord> {
        let body = self.fetch(link).await?;
        extract_page(&body, link, kind)
    }
}
