// 🖼️ Vehicle image enrichment
//
// v1 stored vehicle photos by URL; v2 wants them inline. Fetch the bytes,
// base64 them and wrap them in a data URI.

use crate::error::MigrationError;
use anyhow::Result;
use base64::{engine::general_purpose::STANDARD, Engine};
use std::io::Read;

/// Prefix used for every inlined image. v1 only ever uploaded JPEGs, so the
/// response content type is not consulted.
pub const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// Anything that can turn an image URL into its bytes
pub trait ImageFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Encode raw image bytes as a JPEG data URI
pub fn to_jpeg_data_uri(bytes: &[u8]) -> String {
    format!("{}{}", JPEG_DATA_URI_PREFIX, STANDARD.encode(bytes))
}

/// Fetch `url` and return it as a data URI
pub fn fetch_image_as_data_uri(fetcher: &dyn ImageFetcher, url: &str) -> Result<String> {
    let bytes = fetcher.fetch(url)?;
    tracing::debug!(url, bytes = bytes.len(), "fetched vehicle image");
    Ok(to_jpeg_data_uri(&bytes))
}

// ============================================================================
// HTTP FETCHER
// ============================================================================

/// Blocking HTTP GET. No retries and no timeout: one failure aborts the run.
pub struct HttpImageFetcher {
    agent: ureq::Agent,
}

impl HttpImageFetcher {
    pub fn new() -> Self {
        HttpImageFetcher {
            agent: ureq::AgentBuilder::new().build(),
        }
    }
}

impl Default for HttpImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageFetcher for HttpImageFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = match self.agent.get(url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, _)) => {
                return Err(MigrationError::ImageStatus {
                    url: url.to_string(),
                    status,
                }
                .into())
            }
            Err(e) => {
                return Err(MigrationError::ImageFetch {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
                .into())
            }
        };

        let status = response.status();
        if !(200..300).contains(&status) {
            return Err(MigrationError::ImageStatus {
                url: url.to_string(),
                status,
            }
            .into());
        }

        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| MigrationError::ImageFetch {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(bytes)
    }
}
