//! Where release archives come from.

use std::io::Read;

use anyhow::{Context, Result};
use tracing::{debug, info};

/// A place a GPUPerfAPI release archive can be fetched from.
pub trait ArchiveSource {
    /// URL or label, for logs and error messages.
    fn location(&self) -> &str;

    /// Complete archive bytes.
    fn fetch(&self) -> Result<Vec<u8>>;
}

/// Downloads the archive over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpArchiveSource {
    url: String,
}

impl HttpArchiveSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Default for HttpArchiveSource {
    fn default() -> Self {
        Self::new(crate::DEFAULT_ARCHIVE_URL)
    }
}

impl ArchiveSource for HttpArchiveSource {
    fn location(&self) -> &str {
        &self.url
    }

    fn fetch(&self) -> Result<Vec<u8>> {
        info!(url = %self.url, "downloading GPUPerfAPI archive");
        let response = ureq::get(&self.url)
            .call()
            .with_context(|| format!("HTTP GET {}", self.url))?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .with_context(|| format!("failed to read response body from {}", self.url))?;
        debug!(bytes = bytes.len(), "archive downloaded");
        Ok(bytes)
    }
}

/// Archive already held in memory.
#[derive(Debug, Clone)]
pub struct InMemoryArchive {
    label: String,
    bytes: Vec<u8>,
}

impl InMemoryArchive {
    pub fn new(label: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            bytes,
        }
    }
}

impl ArchiveSource for InMemoryArchive {
    fn location(&self) -> &str {
        &self.label
    }

    fn fetch(&self) -> Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}
