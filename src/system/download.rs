// file: src/system/download.rs
// version: 1.0.0
// guid: 4f6b28d9-7e53-41a0-bc84-19d3e65f72c8

//! Fetching third-party installer scripts

use crate::Result;
use tempfile::NamedTempFile;
use tracing::debug;

/// Downloads installer scripts into temp files so they can be handed to a
/// shell instead of being piped straight off the network
pub struct ScriptFetcher {
    client: reqwest::Client,
}

impl ScriptFetcher {
    /// Create a new fetcher
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Fetch a script over HTTP(S) into a named temp file.
    ///
    /// The file lives as long as the returned handle; callers run it with
    /// `bash <path>` before dropping the handle.
    pub async fn fetch_to_temp(&self, url: &str) -> Result<NamedTempFile> {
        let parsed = url::Url::parse(url).map_err(|e| {
            crate::error::ProvisionError::NetworkError(format!("Invalid installer URL {}: {}", url, e))
        })?;
        if parsed.scheme() != "https" && parsed.scheme() != "http" {
            return Err(crate::error::ProvisionError::NetworkError(format!(
                "Unsupported installer URL scheme: {}",
                parsed.scheme()
            )));
        }

        debug!("Fetching installer script: {}", url);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(crate::error::ProvisionError::NetworkError(format!(
                "Download of {} failed with status: {}",
                url,
                response.status()
            )));
        }

        let bytes = response.bytes().await?;
        let file = NamedTempFile::new()?;
        std::fs::write(file.path(), &bytes)?;

        debug!("Fetched {} bytes to {}", bytes.len(), file.path().display());
        Ok(file)
    }
}

impl Default for ScriptFetcher {
    fn default() -> Self {
        Self::new()
    }
}
