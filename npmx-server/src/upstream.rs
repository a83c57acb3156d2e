//! # Upstream File Listings
//!
//! File listings come from the jsDelivr data API, which returns every file
//! of a published package version as a flat list:
//!
//! ```json
//! {
//!   "default": "/dist/index.min.js",
//!   "files": [
//!     { "name": "/package.json", "hash": "...", "size": 1024, "time": "..." },
//!     { "name": "/dist/index.js", "hash": "...", "size": 2048, "time": "..." }
//!   ]
//! }
//! ```
//!
//! The [`FileListSource`] trait is the seam the endpoint depends on, so tests
//! and alternative CDNs can stand in for [`JsDelivrClient`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::UpstreamConfig;
use crate::{AppError, AppResult};

/// Why a file listing could not be fetched. Never shown to clients.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("invalid upstream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream returned status {status} for {url}")]
    Status { status: u16, url: String },
}

/// One entry of a flat listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FlatFile {
    /// Absolute path inside the package, e.g. `/lib/index.js`.
    pub name: String,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub size: u64,
}

/// File listing of one package version.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileListing {
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub files: Vec<FlatFile>,
}

#[async_trait]
pub trait FileListSource: Send + Sync {
    /// Fetch the flat file listing of an already validated name and version.
    async fn fetch_file_list(
        &self,
        package_name: &str,
        version: &str,
    ) -> Result<FileListing, UpstreamError>;
}

/// HTTP client for the jsDelivr data API.
pub struct JsDelivrClient {
    client: Client,
    config: UpstreamConfig,
}

impl JsDelivrClient {
    pub fn new(config: UpstreamConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(format!(
                "{}/{}",
                config.user_agent,
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Listing URL for a package version.
    pub fn listing_url(&self, package_name: &str, version: &str) -> Result<Url, UpstreamError> {
        let base = self.config.files_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/npm/{package_name}@{version}"))?;
        url.query_pairs_mut().append_pair("structure", "flat");
        Ok(url)
    }
}

#[async_trait]
impl FileListSource for JsDelivrClient {
    async fn fetch_file_list(
        &self,
        package_name: &str,
        version: &str,
    ) -> Result<FileListing, UpstreamError> {
        let url = self.listing_url(package_name, version)?;
        debug!(url = %url, "Fetching file listing");

        let response = self
            .client
            .get(url.clone())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, url = %url, "File listing request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, url = %url, "File listing request rejected");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let listing: FileListing = response.json().await?;
        info!(
            package = %package_name,
            version = %version,
            files = listing.files.len(),
            "Fetched file listing"
        );
        Ok(listing)
    }
}
