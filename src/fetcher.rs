use std::path::Path;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::fetch_error::FetchError;

/// Retrieves the raw CSV weather export. No retries: a failed fetch surfaces as-is.
#[derive(Clone)]
pub struct WeatherCsvFetcher {
    client: reqwest::Client,
    url: String,
}

impl WeatherCsvFetcher {
    pub fn new(url: String, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }

    /// The source URL, also used as the cache key.
    pub fn url(&self) -> &str {
        &self.url
    }

    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch_csv(&self) -> Result<String, FetchError> {
        debug!("Sending HTTP request for weather export");
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        debug!("Received HTTP response with status: {}", status);

        if status.is_success() {
            let text = response.text().await?;
            debug!("Retrieved CSV content, size: {} bytes", text.len());
            Ok(text)
        } else if status.as_u16() == 404 {
            Err(FetchError::NotFound(format!("{} not found on server", self.url)))
        } else if status.is_server_error() {
            Err(FetchError::ServerError(format!(
                "Server error {status} while fetching {}",
                self.url
            )))
        } else {
            Err(FetchError::Status {
                status: status.as_u16(),
                url: self.url.clone(),
            })
        }
    }
}

/// Read an export saved on disk.
#[instrument]
pub fn load_csv_file(path: &Path) -> Result<String, FetchError> {
    let text = std::fs::read_to_string(path)?;
    debug!("Read {} bytes from {}", text.len(), path.display());
    Ok(text)
}
