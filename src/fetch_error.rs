#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Source not found (404): {0}")]
    NotFound(String),
    #[error("Server error (5xx): {0}")]
    ServerError(String),
    #[error("Unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("Failed to read local export: {0}")]
    Io(#[from] std::io::Error),
}
